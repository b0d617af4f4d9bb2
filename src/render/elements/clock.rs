use std::f64::consts::{PI, TAU};

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};

use crate::assets::color::ColorDef;
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::StagecastResult;
use crate::render::draw::{ElementFrame, fill_path, paint_box, stroke_path, with_opacity};
use crate::render::elements::text::{TextBlock, paint_text_element};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::overlay::{OverlayContent, OverlayNode, OverlayPlane, OverlayTextStyle};
use crate::render::target::{PaintTarget, RasterCanvas};
use crate::scene::model::{
    ClockBody, ClockMode, CountdownBody, ElementBody, ElementDef, HourFormat, TextAlign,
};

pub(crate) struct ClockRenderer;

pub(crate) struct TimerRenderer;

pub(crate) struct CountdownRenderer;

/// Digital time text, `HH:MM[:SS]` in 24h or `hh:MM[:SS] AM` in 12h.
pub fn format_digital(t: DateTime<FixedOffset>, format: HourFormat, show_seconds: bool) -> String {
    let pattern = match (format, show_seconds) {
        (HourFormat::H24, true) => "%H:%M:%S",
        (HourFormat::H24, false) => "%H:%M",
        (HourFormat::H12, true) => "%I:%M:%S %p",
        (HourFormat::H12, false) => "%I:%M %p",
    };
    t.format(pattern).to_string()
}

fn format_date(t: DateTime<FixedOffset>) -> String {
    t.format("%a %-d %b %Y").to_string()
}

/// Hour, minute and second hand angles in radians, clockwise from 12 o'clock.
///
/// Each hand includes the fraction of the next smaller unit, so the second hand sweeps with
/// sub-second precision.
pub fn hand_angles(t: DateTime<FixedOffset>) -> (f64, f64, f64) {
    let sec = f64::from(t.second()) + f64::from(t.nanosecond() % 1_000_000_000) / 1e9;
    let min = f64::from(t.minute()) + sec / 60.0;
    let hour = f64::from(t.hour() % 12) + min / 60.0;
    (hour / 12.0 * TAU, min / 60.0 * TAU, sec / 60.0 * TAU)
}

/// Elapsed time as `HH:MM:SS` (or `MM:SS` with total minutes). Negative spans read as zero.
pub fn timer_text(elapsed: TimeDelta, show_hours: bool) -> String {
    let total = elapsed.num_seconds().max(0);
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if show_hours {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{:02}:{s:02}", total / 60)
    }
}

/// Time left until a countdown target, whole seconds rounded up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// `None` once the target has been reached.
pub fn countdown_remaining(now: DateTime<Utc>, target: DateTime<Utc>) -> Option<Remaining> {
    let ms = (target - now).num_milliseconds();
    if ms <= 0 {
        return None;
    }
    let total = (ms + 999) / 1000;
    Some(Remaining {
        days: total / 86_400,
        hours: (total / 3600) % 24,
        minutes: (total / 60) % 60,
        seconds: total % 60,
    })
}

/// Countdown display text; the completion text from the target instant on.
pub fn countdown_text(body: &CountdownBody, now: DateTime<Utc>) -> String {
    let Some(r) = countdown_remaining(now, body.target_time.0) else {
        return body.completed_text.clone();
    };
    let (days, hours) = if body.show_days {
        (r.days, r.hours)
    } else {
        (0, r.hours + r.days * 24)
    };
    match (days > 0, body.show_labels) {
        (true, true) => format!("{days}d {hours}h {}m {}s", r.minutes, r.seconds),
        (true, false) => format!("{days}d {hours:02}:{:02}:{:02}", r.minutes, r.seconds),
        (false, true) => format!("{hours}h {}m {}s", r.minutes, r.seconds),
        (false, false) => format!("{hours:02}:{:02}:{:02}", r.minutes, r.seconds),
    }
}

fn display_time(ctx: &RenderCtx<'_>, body: &ClockBody) -> DateTime<FixedOffset> {
    let offset = body
        .utc_offset_minutes
        .and_then(|m| FixedOffset::east_opt(m.saturating_mul(60)))
        .unwrap_or(ctx.local_offset);
    ctx.now.with_timezone(&offset)
}

/// Current text of a live kind, recomputed from the context's clock.
pub(crate) fn live_text(ctx: &RenderCtx<'_>, e: &ElementDef) -> Option<String> {
    match &e.body {
        ElementBody::Clock(b) => {
            let t = display_time(ctx, b);
            let mut s = format_digital(t, b.format, b.show_seconds);
            if b.show_date {
                s.push('\n');
                s.push_str(&format_date(t));
            }
            Some(s)
        }
        ElementBody::Timer(b) => {
            let start = b.start_time.map(|t| t.0).unwrap_or(ctx.activated_at);
            Some(timer_text(ctx.now - start, b.show_hours))
        }
        ElementBody::Countdown(b) => Some(countdown_text(b, ctx.now)),
        _ => None,
    }
}

fn live_block(e: &ElementDef) -> TextBlock {
    let mut block = TextBlock::from_style(&e.style, (e.height * 0.5).max(8.0));
    block.align = e.style.text_align.unwrap_or(TextAlign::Center);
    block
}

/// Self-updating overlay stand-in for a live element, used under a video background.
pub(crate) fn live_overlay_node(ctx: &RenderCtx<'_>, e: &ElementDef) -> Option<OverlayNode> {
    let text = live_text(ctx, e)?;
    let block = live_block(e);
    Some(OverlayNode {
        id: e.id.clone(),
        rect: Rect::new(e.x, e.y, e.x + e.width, e.y + e.height),
        rotation: e.rotation,
        opacity: e.opacity,
        z_index: e.z_index,
        visible: e.visible,
        plane: OverlayPlane::Above,
        content: OverlayContent::LiveText {
            element_kind: OverlayNode::live_kind(e.kind()),
            text,
            style: OverlayTextStyle {
                color: block.color,
                font_size: f64::from(block.style.size_px),
                font_family: e.style.font_family.clone(),
                bold: block.style.bold,
                align: block.align,
                background: e.style.background_color,
            },
        },
    })
}

fn render_live_text(
    ctx: &mut RenderCtx<'_>,
    e: &ElementDef,
    target: &mut dyn PaintTarget,
) -> StagecastResult<()> {
    let text = live_text(ctx, e).unwrap_or_default();
    let block = live_block(e);
    paint_text_element(ctx, e, target, &text, &block, false, &e.style, 0.0)
}

impl ElementRenderer for ClockRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let ElementBody::Clock(body) = &e.body else {
            return Err(wrong_body(e, "clock"));
        };
        match body.mode {
            ClockMode::Digital => render_live_text(ctx, e, target),
            ClockMode::Analog => {
                let angles = hand_angles(display_time(ctx, body));
                let frame = ElementFrame::of(e);
                target.paint(&mut |vctx| {
                    with_opacity(vctx, frame.opacity, |vctx| {
                        paint_box(vctx, &frame, &e.style, 0.0);
                        paint_analog(vctx, &frame, body, angles);
                    });
                })
            }
        }
    }

    /// The live text node placed over a video background.
    fn overlay_ids(&self, e: &ElementDef) -> Vec<String> {
        vec![e.id.clone()]
    }
}

impl ElementRenderer for TimerRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        if !matches!(e.body, ElementBody::Timer(_)) {
            return Err(wrong_body(e, "timer"));
        }
        render_live_text(ctx, e, target)
    }

    fn overlay_ids(&self, e: &ElementDef) -> Vec<String> {
        vec![e.id.clone()]
    }
}

impl ElementRenderer for CountdownRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        if !matches!(e.body, ElementBody::Countdown(_)) {
            return Err(wrong_body(e, "countdown"));
        }
        render_live_text(ctx, e, target)
    }

    fn overlay_ids(&self, e: &ElementDef) -> Vec<String> {
        vec![e.id.clone()]
    }
}

fn hand(center: Point, angle: f64, length: f64) -> BezPath {
    // Angle 0 points at 12 and grows clockwise in y-down space.
    let a = angle - PI / 2.0;
    let mut p = BezPath::new();
    p.move_to(center);
    p.line_to((center.x + length * a.cos(), center.y + length * a.sin()));
    p
}

fn paint_analog(
    vctx: &mut RasterCanvas,
    frame: &ElementFrame,
    body: &ClockBody,
    (hour, minute, second): (f64, f64, f64),
) {
    let r = frame.width.min(frame.height) / 2.0;
    if r <= 0.0 {
        return;
    }
    let c = Point::new(frame.width / 2.0, frame.height / 2.0);
    let base = frame.transform;
    let face = body.face_color.unwrap_or_else(ColorDef::white);
    let hands = body.hand_color.unwrap_or_else(ColorDef::black);
    let seconds = body
        .second_hand_color
        .unwrap_or_else(|| ColorDef::from_rgba8(0xd0, 0x20, 0x20, 0xff));

    let dial = kurbo::Circle::new(c, r);
    fill_path(vctx, base, &kurbo::Shape::to_path(&dial, 0.1), face);

    let tick_w = (r * 0.02).max(1.0);
    for i in 0..12_u32 {
        let a = f64::from(i) * TAU / 12.0;
        let inner = if i % 3 == 0 { r * 0.8 } else { r * 0.88 };
        let mut p = BezPath::new();
        let dir = Affine::rotate(a - PI / 2.0) * Point::new(1.0, 0.0);
        p.move_to((c.x + dir.x * inner, c.y + dir.y * inner));
        p.line_to((c.x + dir.x * r * 0.95, c.y + dir.y * r * 0.95));
        stroke_path(vctx, base, &p, tick_w, hands);
    }

    stroke_path(vctx, base, &hand(c, hour, r * 0.5), (r * 0.06).max(1.0), hands);
    stroke_path(vctx, base, &hand(c, minute, r * 0.75), (r * 0.04).max(1.0), hands);
    if body.show_seconds {
        stroke_path(vctx, base, &hand(c, second, r * 0.85), (r * 0.015).max(1.0), seconds);
    }
    let hub = kurbo::Circle::new(c, (r * 0.05).max(1.0));
    fill_path(vctx, base, &kurbo::Shape::to_path(&hub, 0.1), hands);
}

#[cfg(test)]
#[path = "../../../tests/unit/render/elements/clock.rs"]
mod tests;
