use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::assets::color::ColorDef;
use crate::assets::decode::ImageHandle;
use crate::foundation::core::{PixelRect, Rect, Rgba8Premul};
use crate::foundation::error::StagecastResult;
use crate::render::draw::{draw_image_in, vignette_pixmap};
use crate::render::overlay::{OverlayContent, OverlayHost, OverlayNode, OverlayPlane};
use crate::render::surface::RasterSurface;
use crate::render::target::RasterScratch;
use crate::scene::model::{BackgroundType, CanvasDef, ImageFit, VignetteDef};

/// Overlay id of the full-screen background video node.
pub const BACKGROUND_VIDEO_ID: &str = "background:video";

/// Background settings resolved from the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundConfig {
    pub mode: BackgroundType,
    /// Solid color for color mode, fallback fill for image mode.
    pub color: ColorDef,
    pub image: Option<String>,
    pub video: Option<String>,
    pub opacity: f64,
    pub fit: ImageFit,
    pub vignette: Option<VignetteDef>,
}

impl BackgroundConfig {
    pub fn from_canvas(c: &CanvasDef) -> Self {
        let clean = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            mode: c.background_type,
            color: c.background.unwrap_or_else(ColorDef::black),
            image: clean(&c.background_image),
            video: clean(&c.background_video),
            opacity: if c.background_opacity.is_finite() {
                c.background_opacity.clamp(0.0, 1.0)
            } else {
                1.0
            },
            fit: c.background_fit,
            vignette: c.background_vignette,
        }
    }

    /// Raster surface must stay transparent so the video beneath shows through.
    pub fn is_video(&self) -> bool {
        self.mode == BackgroundType::Video && self.video.is_some()
    }

    /// Image mode with a source to wait for.
    pub fn awaits_image(&self) -> bool {
        self.mode == BackgroundType::Image && self.image.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct VignetteKey {
    width: u16,
    height: u16,
    strength_bits: u64,
    color: [u8; 4],
}

/// Paints the scene background and owns the background video node.
#[derive(Default)]
pub struct BackgroundRenderer {
    vignette: Option<(VignetteKey, Arc<ImageHandle>)>,
}

impl BackgroundRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full-surface background pass.
    ///
    /// `image` is the decoded background when already available; image mode without it paints
    /// only the solid fallback. Video mode clears the raster and (re)creates the video node.
    pub(crate) fn render(
        &mut self,
        surface: &mut RasterSurface,
        scratch: &mut RasterScratch,
        cfg: &BackgroundConfig,
        image: Option<&ImageHandle>,
        overlay: Option<&mut dyn OverlayHost>,
    ) -> StagecastResult<()> {
        let full = surface.bounds();
        self.restore_rect(surface, scratch, cfg, image, full)?;

        if let Some(host) = overlay {
            match (&cfg.video, cfg.is_video()) {
                (Some(src), true) => {
                    let existing_size = host.get(BACKGROUND_VIDEO_ID).and_then(|n| match &n.content {
                        OverlayContent::BackgroundVideo { src: s, video_size, .. } if s == src => {
                            *video_size
                        }
                        _ => None,
                    });
                    let screen = full.to_rect();
                    let rect = existing_size
                        .map(|(w, h)| video_rect(screen, w, h, cfg.fit))
                        .unwrap_or(screen);
                    host.upsert(OverlayNode {
                        id: BACKGROUND_VIDEO_ID.to_owned(),
                        rect,
                        rotation: 0.0,
                        opacity: cfg.opacity,
                        z_index: i64::MIN,
                        visible: true,
                        plane: OverlayPlane::Below,
                        content: OverlayContent::BackgroundVideo {
                            src: src.clone(),
                            fit: cfg.fit,
                            muted: true,
                            looping: true,
                            video_size: existing_size,
                        },
                    });
                }
                _ => {
                    host.remove(BACKGROUND_VIDEO_ID);
                }
            }
        }
        Ok(())
    }

    /// Drop the background video node.
    pub(crate) fn remove_node(&self, overlay: &mut dyn OverlayHost) {
        overlay.remove(BACKGROUND_VIDEO_ID);
    }

    /// Restore the background strictly inside `rect`.
    pub(crate) fn restore_rect(
        &mut self,
        surface: &mut RasterSurface,
        scratch: &mut RasterScratch,
        cfg: &BackgroundConfig,
        image: Option<&ImageHandle>,
        rect: PixelRect,
    ) -> StagecastResult<()> {
        let rect = rect.intersect(&surface.bounds());
        if rect.is_empty() {
            return Ok(());
        }
        if cfg.is_video() {
            surface.clear_rect(rect);
            return Ok(());
        }

        surface.fill_rect(rect, Rgba8Premul::black());
        match (cfg.mode, image) {
            (BackgroundType::Image, Some(img)) => {
                surface.fill_rect(rect, cfg.color.to_rgba8_premul());
                let screen = surface.bounds().to_rect();
                let opacity = cfg.opacity as f32;
                let fit = cfg.fit;
                scratch.draw_onto(surface, rect, &mut |ctx| {
                    crate::render::draw::with_opacity(ctx, opacity, |ctx| {
                        draw_image_in(ctx, kurbo::Affine::IDENTITY, img, screen, fit);
                    });
                })?;
            }
            (BackgroundType::Image, None) => {
                // Solid fallback until the image resolves (or for good, if it failed).
                surface.fill_rect(rect, cfg.color.to_rgba8_premul());
            }
            _ => {
                surface.fill_rect_over(rect, cfg.color.with_alpha_mul(cfg.opacity).to_rgba8_premul());
            }
        }

        if let Some(v) = cfg.vignette
            && v.strength > 0.0
        {
            let vig = self.vignette_for(surface, v);
            let screen = surface.bounds().to_rect();
            scratch.draw_onto(surface, rect, &mut |ctx| {
                draw_image_in(ctx, kurbo::Affine::IDENTITY, &vig, screen, ImageFit::Fill);
            })?;
        }
        Ok(())
    }

    fn vignette_for(&mut self, surface: &RasterSurface, v: VignetteDef) -> Arc<ImageHandle> {
        let key = VignetteKey {
            width: surface.pixmap().width(),
            height: surface.pixmap().height(),
            strength_bits: v.strength.to_bits(),
            color: v.color.to_straight_rgba8(),
        };
        if let Some((k, img)) = &self.vignette
            && *k == key
        {
            return Arc::clone(img);
        }
        let pm = vignette_pixmap(key.width, key.height, v.strength, v.color);
        let img = Arc::new(ImageHandle::from_pixmap(pm));
        self.vignette = Some((key, Arc::clone(&img)));
        img
    }

    /// Recompute cover/contain sizing of the background video node once its intrinsic size is
    /// known. Returns the new node rect, or `None` when no background video node exists.
    pub fn on_video_metadata(
        &self,
        overlay: &mut dyn OverlayHost,
        screen: (u32, u32),
        video_width: u32,
        video_height: u32,
    ) -> Option<Rect> {
        let mut node = overlay.get(BACKGROUND_VIDEO_ID)?.clone();
        let OverlayContent::BackgroundVideo {
            fit, video_size, ..
        } = &mut node.content
        else {
            return None;
        };
        *video_size = Some((video_width, video_height));
        let screen = Rect::new(0.0, 0.0, f64::from(screen.0), f64::from(screen.1));
        node.rect = video_rect(screen, video_width, video_height, *fit);
        let rect = node.rect;
        overlay.upsert(node);
        Some(rect)
    }
}

/// Manual video box: contain letterboxes, cover/none overflow the screen (host clips), fill
/// stretches.
fn video_rect(screen: Rect, vw: u32, vh: u32, fit: ImageFit) -> Rect {
    let fit = match fit {
        ImageFit::None => ImageFit::Cover,
        f => f,
    };
    crate::render::draw::fit_rect(f64::from(vw), f64::from(vh), screen, fit)
}

/// Playback surface the stall watchdog polls.
pub trait MediaPlayer {
    /// Current playback position in seconds.
    fn position(&self) -> f64;

    /// Duration in seconds; infinite or NaN for live/unknown streams.
    fn duration(&self) -> f64;

    fn seek(&mut self, seconds: f64);

    fn play(&mut self);
}

/// Outcome of one watchdog sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchdogAction {
    /// Position advanced (or this was the first sample).
    Healthy,
    /// Position unchanged for this many consecutive samples.
    Stalled(u32),
    /// Seeked to 0 and asked to play.
    Restarted,
    /// Live or unknown-duration stream; never restarted.
    Unbounded,
}

/// Restarts a looping background video whose position stops advancing.
#[derive(Clone, Debug)]
pub struct StallWatchdog {
    threshold: u32,
    interval: Duration,
    last_position: Option<f64>,
    stalled: u32,
    next_due: Option<Instant>,
    restarts: u32,
}

impl StallWatchdog {
    pub fn new(threshold: u32, interval: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            interval,
            last_position: None,
            stalled: 0,
            next_due: None,
            restarts: 0,
        }
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn reset(&mut self) {
        self.last_position = None;
        self.stalled = 0;
        self.next_due = None;
    }

    /// Sample when due. The first call only arms the schedule.
    pub fn poll(&mut self, now: Instant, player: &mut dyn MediaPlayer) -> Option<WatchdogAction> {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.interval);
                Some(self.sample(player))
            }
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                Some(self.sample(player))
            }
            Some(_) => None,
        }
    }

    /// Take one sample: compare the position with the previous sample.
    pub fn sample(&mut self, player: &mut dyn MediaPlayer) -> WatchdogAction {
        let pos = player.position();
        let advanced = match self.last_position {
            None => true,
            Some(prev) => (pos - prev).abs() > 1e-6,
        };
        self.last_position = Some(pos);
        if advanced {
            self.stalled = 0;
            return WatchdogAction::Healthy;
        }
        self.stalled += 1;

        let duration = player.duration();
        if !duration.is_finite() {
            return WatchdogAction::Unbounded;
        }
        if self.stalled >= self.threshold {
            tracing::warn!(
                position = pos,
                duration,
                samples = self.stalled,
                "background video stalled; restarting"
            );
            player.seek(0.0);
            player.play();
            self.stalled = 0;
            self.last_position = None;
            self.restarts += 1;
            return WatchdogAction::Restarted;
        }
        WatchdogAction::Stalled(self.stalled)
    }
}

#[derive(Clone, Debug)]
struct PlayerState {
    position: f64,
    duration: f64,
    playing: bool,
    seeks: Vec<f64>,
    play_calls: u32,
}

/// Scripted player for tests and headless runs. Clones share state.
#[derive(Clone, Debug)]
pub struct SimulatedPlayer {
    state: Arc<Mutex<PlayerState>>,
}

impl SimulatedPlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlayerState {
                position: 0.0,
                duration,
                playing: true,
                seeks: Vec::new(),
                play_calls: 0,
            })),
        }
    }

    /// Advance playback by `seconds` if playing, wrapping at a finite duration.
    pub fn advance(&self, seconds: f64) {
        let mut s = self.lock();
        if !s.playing {
            return;
        }
        s.position += seconds;
        if s.duration.is_finite() && s.duration > 0.0 && s.position >= s.duration {
            s.position %= s.duration;
        }
    }

    pub fn set_position(&self, seconds: f64) {
        self.lock().position = seconds;
    }

    /// Freeze playback (the stall the watchdog recovers from).
    pub fn stall(&self) {
        self.lock().playing = false;
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.lock().seeks.clone()
    }

    pub fn play_calls(&self) -> u32 {
        self.lock().play_calls
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn position(&self) -> f64 {
        self.lock().position
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn seek(&mut self, seconds: f64) {
        let mut s = self.lock();
        s.position = seconds;
        s.seeks.push(seconds);
    }

    fn play(&mut self) {
        let mut s = self.lock();
        s.playing = true;
        s.play_calls += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
