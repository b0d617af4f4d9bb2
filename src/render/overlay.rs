use std::collections::BTreeMap;

use crate::assets::color::ColorDef;
use crate::foundation::core::{PixelRect, Rect, Rgba8Premul};
use crate::foundation::math::premul_over_px;
use crate::render::surface::FrameRGBA;
use crate::scene::model::{
    ElementKind, FeedItemDef, ImageFit, SlideTransition, TextAlign, TickerDirection,
};

/// Which side of the raster surface a node composites on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayPlane {
    /// Beneath the raster (only visible where the raster is transparent).
    Below,
    #[default]
    Above,
}

/// Text styling for overlay-realized text.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTextStyle {
    pub color: ColorDef,
    pub font_size: f64,
    pub font_family: Option<String>,
    pub bold: bool,
    pub align: TextAlign,
    pub background: Option<ColorDef>,
}

/// What an overlay node plays or shows.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OverlayContent {
    /// Full-screen looping scene background.
    #[serde(rename_all = "camelCase")]
    BackgroundVideo {
        src: String,
        fit: ImageFit,
        muted: bool,
        looping: bool,
        /// Intrinsic size once metadata arrived.
        video_size: Option<(u32, u32)>,
    },
    Video {
        src: String,
        looping: bool,
        muted: bool,
        autoplay: bool,
        fit: ImageFit,
    },
    AnimatedImage {
        src: String,
        fit: ImageFit,
    },
    #[serde(rename_all = "camelCase")]
    Slideshow {
        images: Vec<String>,
        interval_ms: u64,
        transition: SlideTransition,
        fit: ImageFit,
    },
    #[serde(rename_all = "camelCase")]
    Ticker {
        text: String,
        speed_px_per_s: f64,
        direction: TickerDirection,
        style: OverlayTextStyle,
    },
    #[serde(rename_all = "camelCase")]
    Feed {
        items: Vec<FeedItemDef>,
        rotate_interval_ms: u64,
        style: OverlayTextStyle,
    },
    /// Self-updating clock/timer/countdown used when the raster tick is disabled.
    #[serde(rename_all = "camelCase")]
    LiveText {
        element_kind: String,
        text: String,
        style: OverlayTextStyle,
    },
    /// Focus indication for an interactive element.
    FocusRing {
        color: ColorDef,
        width: f64,
        radius: f64,
    },
}

impl OverlayContent {
    /// Solid color used when previewing a frame without the real media.
    fn preview_fill(&self) -> Option<Rgba8Premul> {
        match self {
            Self::BackgroundVideo { .. } => Some(Rgba8Premul::from_straight_rgba(24, 24, 24, 255)),
            Self::Video { .. } => Some(Rgba8Premul::from_straight_rgba(32, 32, 32, 255)),
            Self::AnimatedImage { .. } => Some(Rgba8Premul::from_straight_rgba(48, 48, 64, 255)),
            Self::Slideshow { .. } => Some(Rgba8Premul::from_straight_rgba(40, 48, 40, 255)),
            Self::Ticker { style, .. } | Self::Feed { style, .. } | Self::LiveText { style, .. } => {
                style.background.map(ColorDef::to_rgba8_premul)
            }
            Self::FocusRing { .. } => None,
        }
    }
}

/// A positioned, independently composited layer keyed by element id.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayNode {
    pub id: String,
    /// Device-pixel box, already scaled.
    pub rect: Rect,
    pub rotation: f64,
    pub opacity: f64,
    pub z_index: i64,
    pub visible: bool,
    pub plane: OverlayPlane,
    pub content: OverlayContent,
}

impl OverlayNode {
    /// Overlay id of the focus ring belonging to element `element_id`.
    pub fn focus_id(element_id: &str) -> String {
        format!("focus:{element_id}")
    }

    pub fn live_kind(kind: ElementKind) -> String {
        kind.as_str().to_owned()
    }
}

/// Host-side container of overlay nodes.
pub trait OverlayHost {
    /// Insert or replace the node with `node.id`.
    fn upsert(&mut self, node: OverlayNode);

    fn get(&self, id: &str) -> Option<&OverlayNode>;

    /// Returns `false` when no such node exists.
    fn set_visible(&mut self, id: &str, visible: bool) -> bool;

    fn set_opacity(&mut self, id: &str, opacity: f64) -> bool;

    fn remove(&mut self, id: &str) -> bool;

    /// All nodes in back-to-front order.
    fn nodes(&self) -> Vec<&OverlayNode>;

    fn clear(&mut self);

    fn len(&self) -> usize {
        self.nodes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process overlay container used by the CLI, previews and tests.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct OverlayLayer {
    nodes: BTreeMap<String, OverlayNode>,
    #[serde(skip)]
    upserts: u64,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total upsert calls; lets callers check that toggles did not recreate nodes.
    pub fn upsert_count(&self) -> u64 {
        self.upserts
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.nodes())
    }

    pub fn composite_preview(&self, raster: &FrameRGBA) -> FrameRGBA {
        composite_preview(&self.nodes(), raster)
    }
}

impl OverlayHost for OverlayLayer {
    fn upsert(&mut self, node: OverlayNode) {
        self.upserts += 1;
        self.nodes.insert(node.id.clone(), node);
    }

    fn get(&self, id: &str) -> Option<&OverlayNode> {
        self.nodes.get(id)
    }

    fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(n) => {
                n.visible = visible;
                true
            }
            None => false,
        }
    }

    fn set_opacity(&mut self, id: &str, opacity: f64) -> bool {
        match self.nodes.get_mut(id) {
            Some(n) => {
                n.opacity = opacity.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        self.nodes.remove(id).is_some()
    }

    fn nodes(&self) -> Vec<&OverlayNode> {
        let mut v = self.nodes.values().collect::<Vec<_>>();
        v.sort_by_key(|n| (n.plane == OverlayPlane::Above, n.z_index));
        v
    }

    fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Flatten overlay placeholders and the raster into one opaque preview frame.
///
/// Below-plane nodes are painted first, then the raster, then above-plane nodes. Media nodes are
/// drawn as solid placeholders over their axis-aligned box; focus rings as outlines.
pub fn composite_preview(nodes: &[&OverlayNode], raster: &FrameRGBA) -> FrameRGBA {
    let (w, h) = (raster.width, raster.height);
    let mut out = vec![0u8; (w as usize) * (h as usize) * 4];
    for px in out.chunks_exact_mut(4) {
        px.copy_from_slice(&Rgba8Premul::black().to_array());
    }
    let bounds = PixelRect::from_size(w, h);

    let paint_nodes = |out: &mut [u8], plane: OverlayPlane| {
        for n in nodes.iter().filter(|n| n.visible && n.plane == plane) {
            let r = PixelRect::covering(n.rect).intersect(&bounds);
            match &n.content {
                OverlayContent::FocusRing { color, width, .. } => {
                    let c = color.with_alpha_mul(n.opacity).to_rgba8_premul().to_array();
                    let t = (width.round() as i32).max(1);
                    let edges = [
                        PixelRect::new(r.x0, r.y0, r.x1, r.y0 + t),
                        PixelRect::new(r.x0, r.y1 - t, r.x1, r.y1),
                        PixelRect::new(r.x0, r.y0, r.x0 + t, r.y1),
                        PixelRect::new(r.x1 - t, r.y0, r.x1, r.y1),
                    ];
                    for e in edges {
                        blend_rect(out, w, e.intersect(&r), c);
                    }
                }
                content => {
                    if let Some(fill) = content.preview_fill() {
                        blend_rect(out, w, r, fill.with_opacity(n.opacity).to_array());
                    }
                }
            }
        }
    };

    paint_nodes(&mut out, OverlayPlane::Below);
    if raster.data.len() == out.len() {
        for (d, s) in out.chunks_exact_mut(4).zip(raster.data.chunks_exact(4)) {
            let o = premul_over_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&o);
        }
    }
    paint_nodes(&mut out, OverlayPlane::Above);

    FrameRGBA {
        width: w,
        height: h,
        data: out,
        premultiplied: true,
    }
}

fn blend_rect(buf: &mut [u8], width: u32, r: PixelRect, c: [u8; 4]) {
    if r.is_empty() {
        return;
    }
    let stride = width as usize * 4;
    for y in r.y0..r.y1 {
        let row = y as usize * stride;
        for px in buf[row + r.x0 as usize * 4..row + r.x1 as usize * 4].chunks_exact_mut(4) {
            let o = premul_over_px([px[0], px[1], px[2], px[3]], c);
            px.copy_from_slice(&o);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
