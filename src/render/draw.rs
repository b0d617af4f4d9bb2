use kurbo::Shape;

use crate::assets::color::ColorDef;
use crate::assets::decode::ImageHandle;
use crate::foundation::core::{Affine, BezPath, PixelRect, Point, Rect};
use crate::render::target::RasterCanvas;
use crate::scene::model::{ElementDef, ImageFit, StyleDef};

pub(crate) const TOLERANCE: f64 = 0.1;

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn cpu_color(c: ColorDef) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_straight_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

/// Element-local drawing frame: origin at the element's top-left, rotated about its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ElementFrame {
    pub(crate) transform: Affine,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) opacity: f32,
}

impl ElementFrame {
    pub(crate) fn of(e: &ElementDef) -> Self {
        Self {
            transform: element_transform(e),
            width: e.width.max(0.0),
            height: e.height.max(0.0),
            opacity: e.opacity.clamp(0.0, 1.0) as f32,
        }
    }

    pub(crate) fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Translate to the element origin, then rotate about the element's own center.
pub(crate) fn element_transform(e: &ElementDef) -> Affine {
    let t = Affine::translate((e.x, e.y));
    if e.rotation == 0.0 {
        return t;
    }
    let center = Point::new(e.width / 2.0, e.height / 2.0);
    t * Affine::rotate_about(e.rotation.to_radians(), center)
}

/// Axis-aligned device bounds of the (possibly rotated) element.
pub(crate) fn element_bounds(e: &ElementDef) -> Rect {
    element_transform(e).transform_rect_bbox(Rect::new(0.0, 0.0, e.width.max(0.0), e.height.max(0.0)))
}

pub(crate) fn element_pixel_bounds(e: &ElementDef) -> PixelRect {
    PixelRect::covering(element_bounds(e))
}

/// Pixels an element may paint: its bounds grown by the repaint padding, within `surface`.
pub(crate) fn paint_clip(e: &ElementDef, padding: i32, surface: PixelRect) -> PixelRect {
    element_pixel_bounds(e).pad(padding).intersect(&surface)
}

pub(crate) fn rounded_rect_path(width: f64, height: f64, radius: f64) -> BezPath {
    let r = radius.clamp(0.0, width.min(height) / 2.0);
    if r <= 0.0 {
        return Rect::new(0.0, 0.0, width, height).to_path(TOLERANCE);
    }
    kurbo::RoundedRect::new(0.0, 0.0, width, height, r).to_path(TOLERANCE)
}

/// Fill outline of a stroke along `path`.
pub(crate) fn stroke_outline(path: &BezPath, width: f64) -> BezPath {
    kurbo::stroke(
        path.iter(),
        &kurbo::Stroke::new(width),
        &kurbo::StrokeOpts::default(),
        TOLERANCE,
    )
}

/// Destination rectangle of a `img_w`x`img_h` image placed in `dst` under `fit`.
///
/// Cover and none may overflow `dst`; callers clip to `dst`.
pub(crate) fn fit_rect(img_w: f64, img_h: f64, dst: Rect, fit: ImageFit) -> Rect {
    if img_w <= 0.0 || img_h <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
        return dst;
    }
    let (w, h) = match fit {
        ImageFit::Fill => return dst,
        ImageFit::Cover => {
            let s = (dst.width() / img_w).max(dst.height() / img_h);
            (img_w * s, img_h * s)
        }
        ImageFit::Contain => {
            let s = (dst.width() / img_w).min(dst.height() / img_h);
            (img_w * s, img_h * s)
        }
        ImageFit::None => (img_w, img_h),
    };
    let c = dst.center();
    Rect::from_center_size(c, (w, h))
}

/// Run `f` inside an opacity layer when `opacity < 1`.
pub(crate) fn with_opacity(
    ctx: &mut RasterCanvas,
    opacity: f32,
    f: impl FnOnce(&mut RasterCanvas),
) {
    if opacity <= 0.0 {
        return;
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
        f(ctx);
        ctx.pop_layer();
    } else {
        f(ctx);
    }
}

pub(crate) fn fill_path(ctx: &mut RasterCanvas, base: Affine, path: &BezPath, color: ColorDef) {
    if color.is_transparent() {
        return;
    }
    ctx.set_transform(affine_to_cpu(base));
    ctx.set_paint(cpu_color(color));
    ctx.fill_path(&bezpath_to_cpu(path));
}

pub(crate) fn stroke_path(
    ctx: &mut RasterCanvas,
    base: Affine,
    path: &BezPath,
    width: f64,
    color: ColorDef,
) {
    if width <= 0.0 || color.is_transparent() {
        return;
    }
    fill_path(ctx, base, &stroke_outline(path, width), color);
}

/// Background fill and border from the common style fields.
pub(crate) fn paint_box(
    ctx: &mut RasterCanvas,
    frame: &ElementFrame,
    style: &StyleDef,
    default_radius: f64,
) {
    let radius = style.border_radius.unwrap_or(default_radius);
    let path = rounded_rect_path(frame.width, frame.height, radius);
    if let Some(bg) = style.background_color {
        fill_path(ctx, frame.transform, &path, bg);
    }
    if let (Some(bc), Some(bw)) = (style.border_color, style.border_width)
        && bw > 0.0
    {
        // Inset by half the width so the border stays inside the element box.
        let inset = bw / 2.0;
        let inner = rounded_rect_path(
            (frame.width - bw).max(0.0),
            (frame.height - bw).max(0.0),
            (radius - inset).max(0.0),
        );
        stroke_path(
            ctx,
            frame.transform * Affine::translate((inset, inset)),
            &inner,
            bw,
            bc,
        );
    }
}

/// Draw `img` into `dst` (element-local) under `fit`, clipped to `dst`.
pub(crate) fn draw_image_in(
    ctx: &mut RasterCanvas,
    base: Affine,
    img: &ImageHandle,
    dst: Rect,
    fit: ImageFit,
) {
    let iw = f64::from(img.width);
    let ih = f64::from(img.height);
    let placed = fit_rect(iw, ih, dst, fit);
    let visible = placed.intersect(dst);
    if visible.width() <= 0.0 || visible.height() <= 0.0 || placed.width() <= 0.0 {
        return;
    }
    let sx = placed.width() / iw;
    let sy = placed.height() / ih;
    let to_image = Affine::translate((placed.x0, placed.y0)) * Affine::scale_non_uniform(sx, sy);
    let src = Rect::new(
        (visible.x0 - placed.x0) / sx,
        (visible.y0 - placed.y0) / sy,
        (visible.x1 - placed.x0) / sx,
        (visible.y1 - placed.y0) / sy,
    );
    ctx.set_transform(affine_to_cpu(base * to_image));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(img.paint.clone());
    ctx.fill_rect(&rect_to_cpu(src));
}

/// Radial edge darkening as a full-size premultiplied pixmap.
pub(crate) fn vignette_pixmap(
    width: u16,
    height: u16,
    strength: f64,
    color: ColorDef,
) -> vello_cpu::Pixmap {
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    let strength = strength.clamp(0.0, 1.0);
    let (w, h) = (f64::from(width), f64::from(height));
    let (cx, cy) = (w / 2.0, h / 2.0);
    let max_d = (cx * cx + cy * cy).sqrt().max(1.0);
    let stride = usize::from(width) * 4;
    let bytes = pixmap.data_as_u8_slice_mut();
    for y in 0..usize::from(height) {
        let dy = y as f64 + 0.5 - cy;
        for x in 0..usize::from(width) {
            let dx = x as f64 + 0.5 - cx;
            let d = (dx * dx + dy * dy).sqrt() / max_d;
            // Clear center, smooth falloff toward the corners.
            let t = ((d - 0.45) / 0.55).clamp(0.0, 1.0);
            let a = t * t * (3.0 - 2.0 * t) * strength;
            let px = color.with_alpha_mul(a).to_rgba8_premul().to_array();
            let i = y * stride + x * 4;
            bytes[i..i + 4].copy_from_slice(&px);
        }
    }
    pixmap
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
