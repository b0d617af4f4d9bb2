use std::f64::consts::{PI, TAU};

use kurbo::Shape;

use crate::assets::color::ColorDef;
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::StagecastResult;
use crate::render::draw::{
    ElementFrame, TOLERANCE, fill_path, rounded_rect_path, stroke_path, with_opacity,
};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::target::PaintTarget;
use crate::scene::model::{ArrowDirection, ElementDef, ElementKind, ShapeBody};

const DEFAULT_STAR_POINTS: u32 = 5;
const DEFAULT_STAR_INNER_RATIO: f64 = 0.5;

fn default_fill() -> ColorDef {
    ColorDef::from_rgba8(0x80, 0x80, 0x80, 0xff)
}

pub(crate) struct ShapeRenderer;

impl ElementRenderer for ShapeRenderer {
    fn render(
        &self,
        _ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let Some(body) = e.body.shape() else {
            return Err(wrong_body(e, "shape"));
        };
        let frame = ElementFrame::of(e);
        let kind = e.kind();
        let path = shape_path(kind, body, frame.width, frame.height, e.style.border_radius);

        let stroke_color = body.stroke_color.or(e.style.border_color);
        let stroke_width = if body.stroke_width > 0.0 {
            body.stroke_width
        } else {
            e.style.border_width.unwrap_or(0.0)
        };
        let fill = body
            .fill_color
            .or(e.style.background_color)
            .unwrap_or_else(default_fill);

        target.paint(&mut |vctx| {
            with_opacity(vctx, frame.opacity, |vctx| {
                if kind == ElementKind::Line {
                    // Lines have no interior: the stroke is the shape.
                    let w = if stroke_width > 0.0 {
                        stroke_width
                    } else {
                        frame.height.max(1.0)
                    };
                    stroke_path(vctx, frame.transform, &path, w, stroke_color.unwrap_or(fill));
                    return;
                }
                fill_path(vctx, frame.transform, &path, fill);
                if let Some(c) = stroke_color {
                    stroke_path(vctx, frame.transform, &path, stroke_width, c);
                }
            });
        })
    }
}

/// Element-local outline of a shape kind in a `width`x`height` box.
pub(crate) fn shape_path(
    kind: ElementKind,
    body: &ShapeBody,
    width: f64,
    height: f64,
    radius: Option<f64>,
) -> BezPath {
    let (w, h) = (width.max(0.0), height.max(0.0));
    let center = Point::new(w / 2.0, h / 2.0);
    match kind {
        ElementKind::Circle => kurbo::Ellipse::from_rect(Rect::new(0.0, 0.0, w, h)).to_path(TOLERANCE),
        ElementKind::Triangle => closed(&[
            Point::new(w / 2.0, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ]),
        ElementKind::Diamond => closed(&[
            Point::new(w / 2.0, 0.0),
            Point::new(w, h / 2.0),
            Point::new(w / 2.0, h),
            Point::new(0.0, h / 2.0),
        ]),
        ElementKind::Line => {
            let mut p = BezPath::new();
            p.move_to((0.0, h / 2.0));
            p.line_to((w, h / 2.0));
            p
        }
        ElementKind::Arrow => arrow_path(body.direction, w, h),
        ElementKind::Pentagon => closed(&polygon_vertices(5, center, w.min(h) / 2.0)),
        ElementKind::Hexagon => closed(&polygon_vertices(6, center, w.min(h) / 2.0)),
        ElementKind::Star => {
            let points = body.points.unwrap_or(DEFAULT_STAR_POINTS).max(2);
            let ratio = body
                .inner_radius_ratio
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(DEFAULT_STAR_INNER_RATIO);
            closed(&star_vertices(points, center, w.min(h) / 2.0, ratio))
        }
        _ => rounded_rect_path(w, h, radius.unwrap_or(0.0)),
    }
}

/// Regular `n`-gon vertices, first vertex straight up: angle `i * 2pi/n - pi/2`.
pub fn polygon_vertices(n: u32, center: Point, radius: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let a = f64::from(i) * TAU / f64::from(n) - PI / 2.0;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

/// Star vertices alternating outer and inner radius, starting with an outer point straight up.
pub fn star_vertices(points: u32, center: Point, outer: f64, inner_ratio: f64) -> Vec<Point> {
    let inner = outer * inner_ratio;
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = f64::from(i) * PI / f64::from(points) - PI / 2.0;
            Point::new(center.x + r * a.cos(), center.y + r * a.sin())
        })
        .collect()
}

fn closed(points: &[Point]) -> BezPath {
    let mut p = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return p;
    };
    p.move_to(*first);
    for pt in rest {
        p.line_to(*pt);
    }
    p.close_path();
    p
}

/// Block arrow: a shaft and a triangular head pointing in `dir`.
fn arrow_path(dir: ArrowDirection, w: f64, h: f64) -> BezPath {
    // Built pointing right in a (len x thick) box, then mapped into place.
    let (len, thick) = match dir {
        ArrowDirection::Right | ArrowDirection::Left => (w, h),
        ArrowDirection::Up | ArrowDirection::Down => (h, w),
    };
    let head = (len * 0.4).min(thick).max(0.0);
    let shaft0 = thick * 0.3;
    let shaft1 = thick * 0.7;
    let mut p = closed(&[
        Point::new(0.0, shaft0),
        Point::new(len - head, shaft0),
        Point::new(len - head, 0.0),
        Point::new(len, thick / 2.0),
        Point::new(len - head, thick),
        Point::new(len - head, shaft1),
        Point::new(0.0, shaft1),
    ]);
    let map = match dir {
        ArrowDirection::Right => Affine::IDENTITY,
        ArrowDirection::Left => Affine::new([-1.0, 0.0, 0.0, 1.0, w, 0.0]),
        ArrowDirection::Up => Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, h]),
        ArrowDirection::Down => Affine::new([0.0, 1.0, 1.0, 0.0, 0.0, 0.0]),
    };
    p.apply_affine(map);
    p
}

#[cfg(test)]
#[path = "../../../tests/unit/render/elements/shapes.rs"]
mod tests;
