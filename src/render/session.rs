use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::assets::decode::ImageHandle;
use crate::assets::loader::SessionToken;
use crate::foundation::core::PixelRect;
use crate::layout::scaler::ScaleContext;
use crate::render::background::BackgroundConfig;
use crate::render::live::LiveElementSet;
use crate::scene::model::ElementDef;
use crate::scene::template::Template;

/// Observable steps of a full render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderPhase {
    #[default]
    Idle,
    LoadTemplate,
    ComputeScale,
    SortElements,
    DetermineBackgroundMode,
    /// Color, video, or an already cached image: painted before the elements in the same call.
    BackgroundSync,
    /// Image background in flight; elements wait for its completion (or failure).
    BackgroundAsync,
    RenderElements,
    ScheduleLiveTick,
}

/// Everything belonging to one scene activation.
pub struct RenderSession {
    pub(crate) token: SessionToken,
    pub(crate) template: Arc<Template>,
    pub(crate) scale: ScaleContext,
    /// Scaled elements in stacking order.
    pub(crate) elements: Vec<ElementDef>,
    pub(crate) background: BackgroundConfig,
    /// Decoded background image, kept for synchronous restores.
    pub(crate) background_image: Option<Arc<ImageHandle>>,
    pub(crate) activated_at: DateTime<Utc>,
    /// `false` while the elements wait for the background image.
    pub(crate) elements_rendered: bool,
    /// Padded repaint rectangles of live elements, by element index.
    pub(crate) live: LiveElementSet,
    pub(crate) failed_elements: usize,
    /// Failed element repaints since activation.
    pub(crate) repaint_failures: usize,
}

impl RenderSession {
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn scale(&self) -> &ScaleContext {
        &self.scale
    }

    pub fn elements(&self) -> &[ElementDef] {
        &self.elements
    }

    pub fn background(&self) -> &BackgroundConfig {
        &self.background
    }

    pub fn activated_at(&self) -> DateTime<Utc> {
        self.activated_at
    }

    pub fn elements_rendered(&self) -> bool {
        self.elements_rendered
    }

    pub fn live_rects(&self) -> Vec<PixelRect> {
        self.live.rects()
    }

    /// Elements that failed in the last full pass.
    pub fn failed_elements(&self) -> usize {
        self.failed_elements
    }

    /// Element repaints (live tick or image arrival) that failed since activation.
    pub fn repaint_failures(&self) -> usize {
        self.repaint_failures
    }
}
