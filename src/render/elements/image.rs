use crate::assets::color::ColorDef;
use crate::foundation::core::{BezPath, Rect};
use crate::foundation::error::StagecastResult;
use crate::render::draw::{
    ElementFrame, draw_image_in, fill_path, paint_box, rounded_rect_path, stroke_path,
    with_opacity,
};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::target::{PaintTarget, RasterCanvas};
use crate::scene::model::{ElementBody, ElementDef};

/// Static images on the raster surface.
///
/// Ready images draw from the shared cache (the only path selective repaint uses); a failed load
/// draws a neutral placeholder; otherwise a load is queued and the completion repaints the
/// element's own region.
pub(crate) struct ImageRenderer;

impl ElementRenderer for ImageRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let ElementBody::Image(body) = &e.body else {
            return Err(wrong_body(e, "image"));
        };
        let frame = ElementFrame::of(e);
        let src = body.src.trim();

        if let Some(img) = ctx.images.ready(src) {
            let dst = frame.local_rect();
            return target.paint(&mut |vctx| {
                with_opacity(vctx, frame.opacity, |vctx| {
                    paint_box(vctx, &frame, &e.style, 0.0);
                    draw_image_in(vctx, frame.transform, &img, dst, body.fit);
                });
            });
        }

        if src.is_empty() || ctx.images.failed(src, ctx.token) {
            return target.paint(&mut |vctx| {
                with_opacity(vctx, frame.opacity, |vctx| paint_placeholder(vctx, &frame));
            });
        }

        ctx.request_image(src, &e.id);
        // Box only until the pixels arrive.
        target.paint(&mut |vctx| {
            with_opacity(vctx, frame.opacity, |vctx| paint_box(vctx, &frame, &e.style, 0.0));
        })
    }
}

/// Gray box with a diagonal cross.
fn paint_placeholder(vctx: &mut RasterCanvas, frame: &ElementFrame) {
    let (w, h) = (frame.width, frame.height);
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let body = rounded_rect_path(w, h, 0.0);
    fill_path(vctx, frame.transform, &body, ColorDef::from_rgba8(0x3a, 0x3a, 0x3a, 0xff));

    let mark = ColorDef::from_rgba8(0x5a, 0x5a, 0x5a, 0xff);
    let line_w = (w.min(h) * 0.02).max(1.0);
    let inner = Rect::new(0.0, 0.0, w, h).inset(-line_w);
    let mut cross = BezPath::new();
    cross.move_to((inner.x0, inner.y0));
    cross.line_to((inner.x1, inner.y1));
    cross.move_to((inner.x1, inner.y0));
    cross.line_to((inner.x0, inner.y1));
    stroke_path(vctx, frame.transform, &cross, line_w, mark);
    stroke_path(vctx, frame.transform, &body, line_w * 2.0, mark);
}
