use crate::assets::color::ColorDef;
use crate::assets::text::{ShapedText, TextStyle};
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::layout::scaler::LINE_HEIGHT_MULTIPLIER_MAX;
use crate::render::draw::{ElementFrame, affine_to_cpu, cpu_color, paint_box, with_opacity};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::target::{PaintTarget, RasterCanvas};
use crate::scene::model::{ElementBody, ElementDef, StyleDef, TextAlign, VerticalAlign};

pub(crate) const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Semi-opaque pill behind labels that set no background of their own.
fn default_label_background() -> ColorDef {
    ColorDef::rgba(0.0, 0.0, 0.0, 0.6)
}

pub(crate) struct TextRenderer;

pub(crate) struct LabelRenderer;

impl ElementRenderer for TextRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let ElementBody::Text(body) = &e.body else {
            return Err(wrong_body(e, "text"));
        };
        let block = TextBlock::from_style(&e.style, DEFAULT_FONT_SIZE);
        paint_text_element(ctx, e, target, &body.content, &block, true, &e.style, 0.0)
    }
}

impl ElementRenderer for LabelRenderer {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let ElementBody::Label(body) = &e.body else {
            return Err(wrong_body(e, "label"));
        };
        let mut block = TextBlock::from_style(&e.style, DEFAULT_FONT_SIZE);
        block.align = e.style.text_align.unwrap_or(TextAlign::Center);
        let mut style = e.style.clone();
        style.background_color.get_or_insert_with(default_label_background);
        if style.padding_x.is_none() && style.padding.is_none() {
            style.padding_x = Some((e.height / 2.0).round());
        }
        let pill = e.height.max(0.0) / 2.0;
        paint_text_element(ctx, e, target, &body.content, &block, false, &style, pill)
    }
}

/// Resolved typography of one text run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextBlock {
    pub(crate) style: TextStyle,
    pub(crate) color: ColorDef,
    pub(crate) align: TextAlign,
    pub(crate) valign: VerticalAlign,
}

impl TextBlock {
    pub(crate) fn from_style(s: &StyleDef, default_size: f64) -> Self {
        let size = s.font_size.filter(|v| *v > 0.0).unwrap_or(default_size);
        let line_height_px = s.line_height.filter(|v| *v > 0.0).map(|lh| {
            if lh <= LINE_HEIGHT_MULTIPLIER_MAX {
                (lh * size) as f32
            } else {
                lh as f32
            }
        });
        Self {
            style: TextStyle {
                size_px: size as f32,
                bold: s.font_weight.is_some_and(|w| w >= 600),
                letter_spacing_px: s.letter_spacing.unwrap_or(0.0) as f32,
                line_height_px,
            },
            color: s.color.unwrap_or_else(ColorDef::white),
            align: s.text_align.unwrap_or_default(),
            valign: s.vertical_align.unwrap_or_default(),
        }
    }

    pub(crate) fn sized(mut self, size_px: f64) -> Self {
        self.style.size_px = size_px as f32;
        self
    }
}

/// Content box of `frame` after padding.
pub(crate) fn content_box(frame: &ElementFrame, style: &StyleDef) -> Rect {
    let px = style.padding_x().max(0.0);
    let py = style.padding_y().max(0.0);
    let w = frame.width;
    let h = frame.height;
    Rect::new(px.min(w / 2.0), py.min(h / 2.0), (w - px).max(w / 2.0), (h - py).max(h / 2.0))
}

/// Shape `content` for a box `max_width` wide. Empty content shapes to nothing.
pub(crate) fn shape_block(
    ctx: &mut RenderCtx<'_>,
    content: &str,
    block: &TextBlock,
    max_width: Option<f64>,
) -> StagecastResult<Option<ShapedText>> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    let max = max_width.map(|w| w.max(1.0) as f32);
    ctx.text.shape(content, block.style, max).map(Some)
}

/// Draw shaped lines inside `area` (element-local) with the block's alignment.
pub(crate) fn draw_shaped(
    vctx: &mut RasterCanvas,
    base: Affine,
    shaped: &ShapedText,
    area: Rect,
    block: &TextBlock,
) {
    if block.color.is_transparent() {
        return;
    }
    let total = f64::from(shaped.height());
    let mut top = match block.valign {
        VerticalAlign::Top => area.y0,
        VerticalAlign::Middle => area.y0 + (area.height() - total) / 2.0,
        VerticalAlign::Bottom => area.y1 - total,
    };
    vctx.set_paint(cpu_color(block.color));
    for line in &shaped.lines {
        let lw = f64::from(line.width);
        let x = match block.align {
            TextAlign::Left => area.x0,
            TextAlign::Center => area.x0 + (area.width() - lw) / 2.0,
            TextAlign::Right => area.x1 - lw,
        };
        let baseline = top + f64::from(line.baseline());
        vctx.set_transform(affine_to_cpu(base * Affine::translate((x, baseline))));
        let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        vctx.glyph_run(&shaped.font)
            .font_size(shaped.size_px)
            .fill_glyphs(glyphs);
        top += f64::from(line.line_height);
    }
}

/// Box plus text, the shape shared by text, label and the live text kinds.
///
/// When no font is available the box is still painted and `PlatformUnavailable` is returned.
#[allow(clippy::too_many_arguments)]
pub(crate) fn paint_text_element(
    ctx: &mut RenderCtx<'_>,
    e: &ElementDef,
    target: &mut dyn PaintTarget,
    content: &str,
    block: &TextBlock,
    wrap: bool,
    style: &StyleDef,
    default_radius: f64,
) -> StagecastResult<()> {
    let frame = ElementFrame::of(e);
    let area = content_box(&frame, style);
    let (shaped, missing) = match shape_block(ctx, content, block, wrap.then(|| area.width())) {
        Ok(s) => (s, None),
        Err(err @ StagecastError::PlatformUnavailable(_)) => (None, Some(err)),
        Err(err) => return Err(err),
    };
    target.paint(&mut |vctx| {
        with_opacity(vctx, frame.opacity, |vctx| {
            paint_box(vctx, &frame, style, default_radius);
            if let Some(s) = &shaped {
                draw_shaped(vctx, frame.transform, s, area, block);
            }
        });
    })?;
    missing.map_or(Ok(()), Err)
}
