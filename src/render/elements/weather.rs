use std::f64::consts::TAU;

use kurbo::Shape;

use crate::assets::color::ColorDef;
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::render::draw::{ElementFrame, TOLERANCE, fill_path, paint_box, stroke_path, with_opacity};
use crate::render::elements::text::{TextBlock, content_box, draw_shaped, shape_block};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::target::{PaintTarget, RasterCanvas};
use crate::scene::model::{ElementBody, ElementDef, TextAlign, VerticalAlign, WeatherBody};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Condition {
    Sun,
    Cloud,
    Rain,
    Snow,
}

impl Condition {
    pub(crate) fn classify(condition: &str) -> Self {
        let c = condition.to_ascii_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| c.contains(w));
        if any(&["snow", "sleet", "blizzard", "ice"]) {
            Self::Snow
        } else if any(&["rain", "drizzle", "shower", "storm", "thunder"]) {
            Self::Rain
        } else if any(&["cloud", "overcast", "fog", "mist", "haze"]) {
            Self::Cloud
        } else {
            Self::Sun
        }
    }
}

fn temperature_text(b: &WeatherBody) -> String {
    match b.temperature {
        Some(t) if t.is_finite() => format!("{:.0}{}", t, b.unit.suffix()),
        _ => format!("--{}", b.unit.suffix()),
    }
}

/// Condition glyph plus temperature, condition and location lines.
pub(crate) struct WeatherRenderer;

impl ElementRenderer for WeatherRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let ElementBody::Weather(body) = &e.body else {
            return Err(wrong_body(e, "weather"));
        };
        let frame = ElementFrame::of(e);
        let area = content_box(&frame, &e.style);
        let icon_side = area.height().min(area.width() / 3.0).max(0.0);
        let icon = Rect::new(area.x0, area.y0, area.x0 + icon_side, area.y0 + icon_side);
        let text_area = Rect::new(icon.x1 + icon_side * 0.15, area.y0, area.x1, area.y1);
        let condition = Condition::classify(&body.condition);

        let base = TextBlock::from_style(&e.style, (area.height() * 0.4).max(8.0));
        let mut big = base;
        big.align = e.style.text_align.unwrap_or(TextAlign::Left);
        big.valign = VerticalAlign::Top;
        let small = big.sized(f64::from(base.style.size_px) * 0.45);

        let mut details = body.condition.clone();
        if !body.location.is_empty() {
            if !details.is_empty() {
                details.push('\n');
            }
            details.push_str(&body.location);
        }

        let shaped = shape_block(ctx, &temperature_text(body), &big, None).and_then(|t| {
            let d = shape_block(ctx, &details, &small, Some(text_area.width()))?;
            Ok((t, d))
        });
        let (temp, detail, missing) = match shaped {
            Ok((t, d)) => (t, d, None),
            Err(err @ StagecastError::PlatformUnavailable(_)) => (None, None, Some(err)),
            Err(err) => return Err(err),
        };

        target.paint(&mut |vctx| {
            with_opacity(vctx, frame.opacity, |vctx| {
                paint_box(vctx, &frame, &e.style, 0.0);
                paint_glyph(vctx, frame.transform, icon, condition);
                let mut y = text_area.y0;
                if let Some(t) = &temp {
                    let r = Rect::new(text_area.x0, y, text_area.x1, text_area.y1);
                    draw_shaped(vctx, frame.transform, t, r, &big);
                    y += f64::from(t.height());
                }
                if let Some(d) = &detail {
                    let r = Rect::new(text_area.x0, y, text_area.x1, text_area.y1);
                    draw_shaped(vctx, frame.transform, d, r, &small);
                }
            });
        })?;
        missing.map_or(Ok(()), Err)
    }
}

fn circle(c: Point, r: f64) -> BezPath {
    kurbo::Circle::new(c, r).to_path(TOLERANCE)
}

/// Vector condition glyph inside `r` (element-local).
fn paint_glyph(vctx: &mut RasterCanvas, base: Affine, r: Rect, condition: Condition) {
    let s = r.width().min(r.height());
    if s <= 0.0 {
        return;
    }
    let c = r.center();
    let sun = ColorDef::from_rgba8(0xff, 0xc8, 0x2e, 0xff);
    let cloud = ColorDef::from_rgba8(0xe6, 0xe9, 0xee, 0xff);
    let rain = ColorDef::from_rgba8(0x4a, 0x90, 0xe2, 0xff);

    if condition == Condition::Sun {
        fill_path(vctx, base, &circle(c, s * 0.22), sun);
        let w = (s * 0.05).max(1.0);
        for i in 0..8_u32 {
            let a = f64::from(i) * TAU / 8.0;
            let (dx, dy) = (a.cos(), a.sin());
            let mut ray = BezPath::new();
            ray.move_to((c.x + dx * s * 0.3, c.y + dy * s * 0.3));
            ray.line_to((c.x + dx * s * 0.45, c.y + dy * s * 0.45));
            stroke_path(vctx, base, &ray, w, sun);
        }
        return;
    }

    // Cloud body: three puffs on a flat base, raised when precipitation hangs below.
    let lift = if condition == Condition::Cloud { 0.0 } else { s * 0.12 };
    let cy = c.y - lift;
    fill_path(vctx, base, &circle(Point::new(c.x - s * 0.18, cy + s * 0.02), s * 0.16), cloud);
    fill_path(vctx, base, &circle(Point::new(c.x + s * 0.02, cy - s * 0.08), s * 0.22), cloud);
    fill_path(vctx, base, &circle(Point::new(c.x + s * 0.22, cy + s * 0.04), s * 0.14), cloud);
    let slab = Rect::new(c.x - s * 0.34, cy + s * 0.02, c.x + s * 0.36, cy + s * 0.18);
    fill_path(vctx, base, &kurbo::RoundedRect::from_rect(slab, s * 0.08).to_path(TOLERANCE), cloud);

    let below = cy + s * 0.26;
    match condition {
        Condition::Rain => {
            let w = (s * 0.04).max(1.0);
            for i in -1i32..=1 {
                let x = c.x + f64::from(i) * s * 0.16;
                let mut drop = BezPath::new();
                drop.move_to((x, below));
                drop.line_to((x - s * 0.05, below + s * 0.16));
                stroke_path(vctx, base, &drop, w, rain);
            }
        }
        Condition::Snow => {
            for i in -1i32..=1 {
                let x = c.x + f64::from(i) * s * 0.16;
                let y = below + s * 0.08 + f64::from(i.abs()) * s * 0.05;
                fill_path(vctx, base, &circle(Point::new(x, y), s * 0.035), cloud);
            }
        }
        _ => {}
    }
}
