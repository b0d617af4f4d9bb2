//! Raster surface, overlay layer and the compositor that drives both from a scaled scene.

pub mod background;
pub mod compositor;
pub(crate) mod draw;
pub mod elements;
pub mod host;
pub mod live;
pub mod overlay;
pub mod session;
pub mod surface;
pub mod target;
