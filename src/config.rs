use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::StagecastResult;
use crate::layout::scaler::FitMode;
use crate::navigation::focus::FocusConfig;

/// Engine tunables. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub fit_mode: FitMode,
    pub live_tick_ms: u64,
    /// Margin around live elements for the selective repaint.
    pub repaint_padding_px: u32,
    pub focus: FocusConfig,
    /// Non-advancing samples before the background video is restarted.
    pub watchdog_stall_samples: u32,
    pub watchdog_interval_ms: u64,
    /// Difference between measured and logical host size tolerated before overlay geometry is
    /// rescaled.
    pub overlay_measure_tolerance_px: u32,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    /// Root relative media sources resolve against.
    pub assets_root: PathBuf,
    /// Display offset for clocks without their own; the host's local offset when absent.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::Fit,
            live_tick_ms: 1000,
            repaint_padding_px: 2,
            focus: FocusConfig::default(),
            watchdog_stall_samples: 3,
            watchdog_interval_ms: 1000,
            overlay_measure_tolerance_px: 2,
            font_path: None,
            bold_font_path: None,
            assets_root: PathBuf::from("."),
            utc_offset_minutes: None,
        }
    }
}

impl EngineConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> StagecastResult<Self> {
        let cfg: Self = serde_json::from_reader(r).context("parse engine config JSON")?;
        Ok(cfg)
    }

    /// Load a JSON config file, then apply environment overrides.
    pub fn from_path(path: impl AsRef<Path>) -> StagecastResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open engine config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))?.with_env_overrides()
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> StagecastResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `STAGECAST_FONT`, `STAGECAST_ASSETS` and `STAGECAST_FIT` when set and non-empty.
    pub fn with_env_overrides(mut self) -> StagecastResult<Self> {
        if let Some(font) = env_nonempty("STAGECAST_FONT") {
            self.font_path = Some(PathBuf::from(font));
        }
        if let Some(root) = env_nonempty("STAGECAST_ASSETS") {
            self.assets_root = PathBuf::from(root);
        }
        if let Some(fit) = env_nonempty("STAGECAST_FIT") {
            self.fit_mode = fit.parse()?;
        }
        Ok(self)
    }

    pub fn live_tick_interval(&self) -> Duration {
        Duration::from_millis(self.live_tick_ms.max(1))
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_interval_ms.max(1))
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
