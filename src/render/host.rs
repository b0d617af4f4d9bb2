use crate::foundation::error::StagecastResult;
use crate::render::overlay::{OverlayHost, OverlayLayer, composite_preview};
use crate::render::surface::{FrameRGBA, RasterSurface};

/// One raster surface plus the overlay container stacked with it.
///
/// Must be attached to the compositor before the first render.
pub struct HostSurface {
    name: String,
    pub(crate) surface: RasterSurface,
    pub(crate) overlay: Box<dyn OverlayHost>,
    /// Container size as the host measured it; `None` when it matches the surface.
    pub(crate) measured: Option<(u32, u32)>,
}

impl HostSurface {
    /// Surface with an in-process [`OverlayLayer`].
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> StagecastResult<Self> {
        Self::with_overlay(name, width, height, Box::new(OverlayLayer::new()))
    }

    pub fn with_overlay(
        name: impl Into<String>,
        width: u32,
        height: u32,
        overlay: Box<dyn OverlayHost>,
    ) -> StagecastResult<Self> {
        Ok(Self {
            name: name.into(),
            surface: RasterSurface::new(width, height)?,
            overlay,
            measured: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    /// Record the container size the host actually laid out.
    pub fn set_measured_size(&mut self, width: u32, height: u32) {
        self.measured = Some((width, height));
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn overlay(&self) -> &dyn OverlayHost {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> &mut dyn OverlayHost {
        self.overlay.as_mut()
    }

    /// Raster pixels only.
    pub fn frame(&self) -> FrameRGBA {
        self.surface.to_frame()
    }

    /// Raster with overlay node placeholders composited below and above it.
    pub fn preview(&self) -> FrameRGBA {
        composite_preview(&self.overlay.nodes(), &self.frame())
    }
}
