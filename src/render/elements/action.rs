use crate::assets::color::ColorDef;
use crate::foundation::core::Rect;
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::render::draw::{ElementFrame, element_bounds, paint_box, with_opacity};
use crate::render::elements::text::{
    DEFAULT_FONT_SIZE, TextBlock, content_box, draw_shaped, shape_block,
};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::overlay::{OverlayContent, OverlayNode, OverlayPlane};
use crate::render::target::PaintTarget;
use crate::scene::model::{
    ActionBody, ElementBody, ElementDef, ElementKind, StyleDef, TextAlign, VerticalAlign,
};

pub(crate) const FOCUS_RING_WIDTH: f64 = 4.0;

fn default_surface() -> ColorDef {
    ColorDef::from_rgba8(0x26, 0x2a, 0x33, 0xff)
}

/// Action, button and card: raster body plus a lazily created focus ring overlay.
pub(crate) struct ActionRenderer;

impl ElementRenderer for ActionRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let body = match &e.body {
            ElementBody::Action(b) | ElementBody::Button(b) | ElementBody::Card(b) => b,
            _ => return Err(wrong_body(e, "action")),
        };
        let kind = e.kind();
        let frame = ElementFrame::of(e);

        let mut style = e.style.clone();
        style.background_color.get_or_insert_with(default_surface);
        let default_radius = (e.height.min(e.width) * 0.12).round();
        if style.padding.is_none() && style.padding_x.is_none() && style.padding_y.is_none() {
            style.padding = Some((e.height.min(e.width) * 0.1).round());
        }
        let area = content_box(&frame, &style);

        let painted = if kind == ElementKind::Card {
            paint_card(ctx, body, &frame, &style, area, default_radius, target)
        } else {
            let mut block = TextBlock::from_style(&style, DEFAULT_FONT_SIZE);
            block.align = style.text_align.unwrap_or(TextAlign::Center);
            let shaped = shape_block(ctx, &body.content, &block, Some(area.width()));
            let (text, missing) = split_missing(shaped)?;
            target.paint(&mut |vctx| {
                with_opacity(vctx, frame.opacity, |vctx| {
                    paint_box(vctx, &frame, &style, default_radius);
                    if let Some(t) = &text {
                        draw_shaped(vctx, frame.transform, t, area, &block);
                    }
                });
            })?;
            missing.map_or(Ok(()), Err)
        };

        place_focus_ring(e, body, style.border_radius.unwrap_or(default_radius), target)?;
        painted
    }

    fn overlay_ids(&self, e: &ElementDef) -> Vec<String> {
        vec![OverlayNode::focus_id(&e.id)]
    }
}

fn split_missing<T>(r: StagecastResult<Option<T>>) -> StagecastResult<(Option<T>, Option<StagecastError>)> {
    match r {
        Ok(t) => Ok((t, None)),
        Err(err @ StagecastError::PlatformUnavailable(_)) => Ok((None, Some(err))),
        Err(err) => Err(err),
    }
}

/// Icon and title on the first row, subtitle below.
#[allow(clippy::too_many_arguments)]
fn paint_card(
    ctx: &mut RenderCtx<'_>,
    body: &ActionBody,
    frame: &ElementFrame,
    style: &StyleDef,
    area: Rect,
    default_radius: f64,
    target: &mut dyn PaintTarget,
) -> StagecastResult<()> {
    let mut title = TextBlock::from_style(style, DEFAULT_FONT_SIZE);
    title.align = style.text_align.unwrap_or(TextAlign::Left);
    title.valign = VerticalAlign::Top;
    let mut sub = title.sized(f64::from(title.style.size_px) * 0.7);
    sub.color = title.color.with_alpha_mul(0.75);

    let heading = match body.icon.as_deref().filter(|i| !i.trim().is_empty()) {
        Some(icon) => format!("{icon}  {}", body.content),
        None => body.content.clone(),
    };
    let shaped = shape_block(ctx, &heading, &title, Some(area.width())).and_then(|h| {
        let s = shape_block(
            ctx,
            body.subtitle.as_deref().unwrap_or_default(),
            &sub,
            Some(area.width()),
        )?;
        Ok(h.map(|h| (h, s)))
    });
    let (lines, missing) = split_missing(shaped)?;
    let frame = *frame;
    target.paint(&mut |vctx| {
        with_opacity(vctx, frame.opacity, |vctx| {
            paint_box(vctx, &frame, style, default_radius);
            if let Some((h, s)) = &lines {
                draw_shaped(vctx, frame.transform, h, area, &title);
                if let Some(s) = s {
                    let below = Rect::new(area.x0, area.y0 + f64::from(h.height()), area.x1, area.y1);
                    draw_shaped(vctx, frame.transform, s, below, &sub);
                }
            }
        });
    })?;
    missing.map_or(Ok(()), Err)
}

/// Create the focus ring once; afterwards only follow geometry changes, never visibility.
fn place_focus_ring(
    e: &ElementDef,
    body: &ActionBody,
    radius: f64,
    target: &mut dyn PaintTarget,
) -> StagecastResult<()> {
    let id = OverlayNode::focus_id(&e.id);
    let rect = element_bounds(e).inflate(FOCUS_RING_WIDTH, FOCUS_RING_WIDTH);
    let existing = target.node(&id).map(|n| (n.rect, n.visible));
    if let Some((r, _)) = existing
        && r == rect
    {
        return Ok(());
    }
    target.place(OverlayNode {
        id,
        rect,
        rotation: 0.0,
        opacity: 1.0,
        z_index: e.z_index,
        visible: existing.is_some_and(|(_, v)| v),
        plane: OverlayPlane::Above,
        content: OverlayContent::FocusRing {
            color: body.focus_color.unwrap_or_else(ColorDef::white),
            width: FOCUS_RING_WIDTH,
            radius: radius + FOCUS_RING_WIDTH,
        },
    })
}
