//! Stagecast composites template-driven signage scenes onto a raster surface.
//!
//! A host attaches a [`HostSurface`] (raster plus overlay container) to a [`Compositor`], points
//! it at a [`TemplateStore`] and then:
//!
//! - calls [`Compositor::render`] for every new scene
//! - calls [`Compositor::pump`] from its event loop to apply image loads, run the 1 Hz live
//!   repaint and supervise the background video
//! - forwards remote-control keys to [`Compositor::move_focus`] and
//!   [`Compositor::execute_focused`]
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
mod foundation;
pub mod layout;
pub mod navigation;
pub mod render;
pub mod scene;

pub use crate::foundation::core::{Affine, BezPath, PixelRect, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{StagecastError, StagecastResult};
pub use crate::foundation::time::{Clock, FixedClock, SystemClock};

pub use crate::assets::loader::{
    AssetLoader, FsAssetLoader, LoadCompletion, LoadPurpose, LoadRequest, ManualLoader,
    SessionToken,
};
pub use crate::assets::text::TextLayoutEngine;
pub use crate::config::EngineConfig;
pub use crate::layout::scaler::{FitMode, ScaleContext};
pub use crate::navigation::action::{ActionHost, ActionOutcome, RecordingActionHost};
pub use crate::navigation::focus::{Direction, FocusConfig, FocusNavigator};
pub use crate::render::background::{MediaPlayer, SimulatedPlayer, WatchdogAction};
pub use crate::render::compositor::{Compositor, PumpReport, RenderReport, sort_by_stacking};
pub use crate::render::host::HostSurface;
pub use crate::render::live::LiveElementSet;
pub use crate::render::overlay::{OverlayContent, OverlayHost, OverlayLayer, OverlayNode, OverlayPlane};
pub use crate::render::session::{RenderPhase, RenderSession};
pub use crate::render::surface::{FrameRGBA, RasterSurface};
pub use crate::scene::model::{ElementDef, ElementKind, TemplateDef};
pub use crate::scene::store::{InMemoryTemplateStore, LinkContext, TemplateStore};
pub use crate::scene::template::{Template, TemplateIssue};
