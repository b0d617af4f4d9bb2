use crate::foundation::core::{PixelRect, Rect};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::render::overlay::{OverlayHost, OverlayNode};
use crate::render::surface::RasterSurface;

/// Capability renderers draw through. Raster targets accept draw commands; overlay targets
/// accept positioned nodes.
pub trait PaintTarget {
    /// Device size of the scene in pixels.
    fn size(&self) -> (u32, u32);

    /// Issue raster draw commands. They land on the surface only inside the target's clip.
    fn paint(&mut self, draw: &mut dyn FnMut(&mut RasterCanvas)) -> StagecastResult<()>;

    /// Realize (or replace) an overlay node.
    fn place(&mut self, node: OverlayNode) -> StagecastResult<()>;

    /// Existing overlay node with `id`, if this target can see the overlay layer.
    fn node(&self, id: &str) -> Option<&OverlayNode>;
}

/// Render context covering one clip rectangle of the surface.
///
/// Callers work in surface coordinates: [`RasterCanvas::set_transform`] shifts every transform
/// by the clip origin. Everything else derefs to the `vello_cpu` context.
pub struct RasterCanvas {
    ctx: vello_cpu::RenderContext,
    origin: vello_cpu::kurbo::Affine,
}

impl RasterCanvas {
    fn new(width: u16, height: u16) -> Self {
        Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            origin: vello_cpu::kurbo::Affine::IDENTITY,
        }
    }

    /// Set the geometry transform, in surface coordinates.
    pub fn set_transform(&mut self, transform: vello_cpu::kurbo::Affine) {
        self.ctx.set_transform(self.origin * transform);
    }

    fn begin(&mut self, x0: i32, y0: i32) {
        self.ctx.reset();
        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.origin = vello_cpu::kurbo::Affine::translate((-f64::from(x0), -f64::from(y0)));
        self.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl std::ops::Deref for RasterCanvas {
    type Target = vello_cpu::RenderContext;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl std::ops::DerefMut for RasterCanvas {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ctx
    }
}

/// Reusable rasterization scratch sized to the last clip rectangle.
pub(crate) struct RasterScratch {
    canvas: RasterCanvas,
    pixmap: vello_cpu::Pixmap,
}

impl RasterScratch {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            canvas: RasterCanvas::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        }
    }

    pub(crate) fn size(&self) -> (u16, u16) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn ensure(&mut self, width: u16, height: u16) {
        if self.size() != (width, height) {
            *self = Self::new(width, height);
        }
    }

    /// Rasterize `draw` into a scratch covering `clip` and source-over it onto `surface`.
    pub(crate) fn draw_onto(
        &mut self,
        surface: &mut RasterSurface,
        clip: PixelRect,
        draw: &mut dyn FnMut(&mut RasterCanvas),
    ) -> StagecastResult<()> {
        let clip = clip.intersect(&surface.bounds());
        if clip.is_empty() {
            return Ok(());
        }
        let (Ok(w), Ok(h)) = (u16::try_from(clip.width()), u16::try_from(clip.height())) else {
            return Err(StagecastError::platform("clip exceeds the raster size limit"));
        };
        self.ensure(w, h);
        self.canvas.begin(clip.x0, clip.y0);
        draw(&mut self.canvas);
        self.canvas.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.canvas.render_to_pixmap(&mut self.pixmap);
        surface.composite_over(&self.pixmap, (clip.x0, clip.y0), clip)
    }
}

/// Draws onto the raster surface, clipped to one rectangle.
///
/// During a full render the overlay layer is attached so interactive renderers can create their
/// focus rings; selective repaints pass no overlay and node placement becomes a no-op.
pub struct RasterTarget<'a> {
    surface: &'a mut RasterSurface,
    scratch: &'a mut RasterScratch,
    clip: PixelRect,
    overlay: Option<&'a mut dyn OverlayHost>,
}

impl<'a> RasterTarget<'a> {
    pub(crate) fn new(
        surface: &'a mut RasterSurface,
        scratch: &'a mut RasterScratch,
        clip: PixelRect,
        overlay: Option<&'a mut dyn OverlayHost>,
    ) -> Self {
        Self {
            surface,
            scratch,
            clip,
            overlay,
        }
    }

    pub fn clip(&self) -> PixelRect {
        self.clip
    }
}

impl PaintTarget for RasterTarget<'_> {
    fn size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    fn paint(&mut self, draw: &mut dyn FnMut(&mut RasterCanvas)) -> StagecastResult<()> {
        self.scratch.draw_onto(self.surface, self.clip, draw)
    }

    fn place(&mut self, node: OverlayNode) -> StagecastResult<()> {
        if let Some(host) = self.overlay.as_deref_mut() {
            host.upsert(node);
        }
        Ok(())
    }

    fn node(&self, id: &str) -> Option<&OverlayNode> {
        self.overlay.as_deref().and_then(|h| h.get(id))
    }
}

/// Realizes elements as overlay nodes with geometry copied from the scaled element.
pub struct OverlayNodeTarget<'a> {
    host: &'a mut dyn OverlayHost,
    logical: (u32, u32),
    measured: Option<(u32, u32)>,
    tolerance_px: u32,
}

impl<'a> OverlayNodeTarget<'a> {
    pub fn new(
        host: &'a mut dyn OverlayHost,
        logical: (u32, u32),
        measured: Option<(u32, u32)>,
        tolerance_px: u32,
    ) -> Self {
        Self {
            host,
            logical,
            measured,
            tolerance_px,
        }
    }

    /// Host-space rect for a device-space rect.
    ///
    /// Geometry is used 1:1 unless the host measured its container at a size that differs from
    /// the logical surface by more than the tolerance; then positions and sizes are rescaled.
    pub fn map_rect(&self, r: Rect) -> Rect {
        let Some((mw, mh)) = self.measured else {
            return r;
        };
        let (lw, lh) = self.logical;
        if lw == 0 || lh == 0 || mw == 0 || mh == 0 {
            return r;
        }
        if mw.abs_diff(lw) <= self.tolerance_px && mh.abs_diff(lh) <= self.tolerance_px {
            return r;
        }
        let sx = f64::from(mw) / f64::from(lw);
        let sy = f64::from(mh) / f64::from(lh);
        Rect::new(r.x0 * sx, r.y0 * sy, r.x1 * sx, r.y1 * sy)
    }
}

impl PaintTarget for OverlayNodeTarget<'_> {
    fn size(&self) -> (u32, u32) {
        self.logical
    }

    fn paint(&mut self, _draw: &mut dyn FnMut(&mut RasterCanvas)) -> StagecastResult<()> {
        Err(StagecastError::platform("overlay target has no raster surface"))
    }

    fn place(&mut self, mut node: OverlayNode) -> StagecastResult<()> {
        node.rect = self.map_rect(node.rect);
        self.host.upsert(node);
        Ok(())
    }

    fn node(&self, id: &str) -> Option<&OverlayNode> {
        self.host.get(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
