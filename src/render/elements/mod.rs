//! Per-kind element renderers, selected through a table indexed by [`ElementKind`].

mod action;
mod clock;
mod image;
mod media;
mod shapes;
mod text;
mod weather;

pub use clock::{
    Remaining, countdown_remaining, countdown_text, format_digital, hand_angles, timer_text,
};
pub use shapes::{polygon_vertices, star_vertices};

pub(crate) use clock::live_overlay_node;
pub(crate) use text::{TextBlock, draw_shaped};

use chrono::{DateTime, FixedOffset, Utc};

use crate::assets::loader::{ImageCache, LoadPurpose, LoadRequest, SessionToken};
use crate::assets::text::TextLayoutEngine;
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::render::target::PaintTarget;
use crate::scene::model::{ElementDef, ElementKind};

/// Per-call inputs shared by every renderer.
pub(crate) struct RenderCtx<'a> {
    /// Wall-clock instant the frame represents.
    pub(crate) now: DateTime<Utc>,
    /// When the current scene became active (timer origin).
    pub(crate) activated_at: DateTime<Utc>,
    /// Display offset for clocks without their own `utcOffsetMinutes`.
    pub(crate) local_offset: FixedOffset,
    pub(crate) text: &'a mut TextLayoutEngine,
    pub(crate) images: &'a ImageCache,
    /// Sink for new image loads; `None` during selective repaint, where only cached images draw.
    pub(crate) requests: Option<&'a mut Vec<LoadRequest>>,
    pub(crate) token: SessionToken,
}

impl RenderCtx<'_> {
    /// Queue a load for `source` on behalf of element `element_id`.
    ///
    /// Returns `false` when loads are not allowed in this pass.
    pub(crate) fn request_image(&mut self, source: &str, element_id: &str) -> bool {
        let token = self.token;
        let Some(requests) = self.requests.as_deref_mut() else {
            return false;
        };
        if !self.images.needs_request(source, token)
            || requests.iter().any(|r| r.source == source)
        {
            return true;
        }
        requests.push(LoadRequest {
            token,
            source: source.to_owned(),
            purpose: LoadPurpose::Element(element_id.to_owned()),
        });
        true
    }
}

/// Draws one element kind.
///
/// The element is already in device space. Renderers apply the element transform and opacity
/// themselves and go through `target` for every pixel or node they produce.
pub(crate) trait ElementRenderer: Sync {
    fn render(
        &self,
        ctx: &mut RenderCtx<'_>,
        e: &ElementDef,
        target: &mut dyn PaintTarget,
    ) -> StagecastResult<()>;

    /// Overlay node ids this renderer creates for `e`.
    fn overlay_ids(&self, _e: &ElementDef) -> Vec<String> {
        Vec::new()
    }
}

static RENDERERS: [&dyn ElementRenderer; ElementKind::ALL.len()] = [
    &text::TextRenderer,
    &text::LabelRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &shapes::ShapeRenderer,
    &clock::ClockRenderer,
    &clock::TimerRenderer,
    &clock::CountdownRenderer,
    &image::ImageRenderer,
    &media::MediaRenderer,
    &media::MediaRenderer,
    &media::MediaRenderer,
    &weather::WeatherRenderer,
    &media::MediaRenderer,
    &media::MediaRenderer,
    &action::ActionRenderer,
    &action::ActionRenderer,
    &action::ActionRenderer,
];

pub(crate) fn renderer_for(kind: ElementKind) -> &'static dyn ElementRenderer {
    RENDERERS[kind as usize]
}

/// Render one element, containing its failure.
///
/// A missing platform capability is logged and the element counts as drawn (whatever it managed
/// to paint stays). Any other error becomes `RenderIsolation`, is logged, and is returned so the
/// caller can count it; the caller keeps going with the next element.
pub(crate) fn render_isolated(
    ctx: &mut RenderCtx<'_>,
    e: &ElementDef,
    target: &mut dyn PaintTarget,
) -> StagecastResult<()> {
    if !e.visible || e.opacity <= 0.0 {
        return Ok(());
    }
    match renderer_for(e.kind()).render(ctx, e, target) {
        Ok(()) => Ok(()),
        Err(StagecastError::PlatformUnavailable(msg)) => {
            tracing::warn!(element_id = %e.id, kind = %e.kind(), %msg, "capability unavailable");
            Ok(())
        }
        Err(err) => {
            tracing::error!(element_id = %e.id, kind = %e.kind(), error = %err, "element render failed");
            Err(StagecastError::isolation(e.id.clone(), err.to_string()))
        }
    }
}

fn wrong_body(e: &ElementDef, expected: &str) -> StagecastError {
    StagecastError::config(format!(
        "element \"{}\" of kind {} routed to the {expected} renderer",
        e.id,
        e.kind()
    ))
}

#[cfg(test)]
#[path = "../../../tests/unit/render/elements/mod.rs"]
mod tests;
