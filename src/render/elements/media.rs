use crate::foundation::core::Rect;
use crate::foundation::error::StagecastResult;
use crate::render::elements::text::{DEFAULT_FONT_SIZE, TextBlock};
use crate::render::elements::{ElementRenderer, RenderCtx, wrong_body};
use crate::render::overlay::{OverlayContent, OverlayNode, OverlayPlane, OverlayTextStyle};
use crate::render::target::PaintTarget;
use crate::scene::model::{ElementBody, ElementDef, StyleDef};

/// Kinds the raster cannot animate: realized as overlay nodes keyed by element id.
pub(crate) struct MediaRenderer;

impl ElementRenderer for MediaRenderer {
    fn render(
        &self,
        _ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()> {
        let content = match &e.body {
            ElementBody::AnimatedImage(b) => OverlayContent::AnimatedImage {
                src: b.src.trim().to_owned(),
                fit: b.fit,
            },
            ElementBody::Video(b) => OverlayContent::Video {
                src: b.src.trim().to_owned(),
                looping: b.looping,
                muted: b.muted,
                autoplay: b.autoplay,
                fit: b.fit,
            },
            ElementBody::Slideshow(b) => OverlayContent::Slideshow {
                images: b.images.clone(),
                interval_ms: b.interval_ms.max(1),
                transition: b.transition,
                fit: b.fit,
            },
            ElementBody::Ticker(b) => OverlayContent::Ticker {
                text: b.content.clone(),
                speed_px_per_s: b.speed,
                direction: b.direction,
                style: overlay_text_style(&e.style, e.height * 0.6),
            },
            ElementBody::Feed(b) => OverlayContent::Feed {
                items: b.items.clone(),
                rotate_interval_ms: b.rotate_interval_ms.max(1),
                style: overlay_text_style(&e.style, DEFAULT_FONT_SIZE),
            },
            _ => return Err(wrong_body(e, "media")),
        };
        target.place(OverlayNode {
            id: e.id.clone(),
            rect: Rect::new(e.x, e.y, e.x + e.width.max(0.0), e.y + e.height.max(0.0)),
            rotation: e.rotation,
            opacity: e.opacity.clamp(0.0, 1.0),
            z_index: e.z_index,
            visible: e.visible,
            plane: OverlayPlane::Above,
            content,
        })
    }

    fn overlay_ids(&self, e: &ElementDef) -> Vec<String> {
        vec![e.id.clone()]
    }
}

fn overlay_text_style(style: &StyleDef, default_size: f64) -> OverlayTextStyle {
    let block = TextBlock::from_style(style, default_size.max(1.0));
    OverlayTextStyle {
        color: block.color,
        font_size: f64::from(block.style.size_px),
        font_family: style.font_family.clone(),
        bold: block.style.bold,
        align: block.align,
        background: style.background_color,
    }
}
