use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster in premultiplied RGBA8, safe to send across the loader channel.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Paint-ready image shared by the session cache.
#[derive(Clone)]
pub struct ImageHandle {
    pub width: u32,
    pub height: u32,
    pub(crate) paint: vello_cpu::Image,
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl ImageHandle {
    pub fn from_decoded(img: &DecodedImage) -> StagecastResult<Self> {
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        Ok(Self {
            width: img.width,
            height: img.height,
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
        })
    }

    /// Wrap an already-rendered pixmap (vignettes and other generated paints).
    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        let width = u32::from(pixmap.width());
        let height = u32::from(pixmap.height());
        Self {
            width,
            height,
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
        }
    }
}

/// Largest edge an SVG is rasterized at.
const SVG_MAX_DIM: u32 = 4_096;

/// Decode PNG/JPEG/GIF (first frame) or SVG bytes.
///
/// SVG is recognized by a `.svg` source suffix or by sniffing the leading bytes.
pub fn decode_image(bytes: &[u8], source: &str) -> StagecastResult<DecodedImage> {
    if looks_like_svg(bytes, source) {
        return decode_svg(bytes);
    }
    let dyn_img = image::load_from_memory(bytes)
        .with_context(|| format!("decode image '{source}'"))
        .map_err(|e| StagecastError::media_load(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul,
    })
}

fn looks_like_svg(bytes: &[u8], source: &str) -> bool {
    if source.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn decode_svg(bytes: &[u8]) -> StagecastResult<DecodedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(|e| StagecastError::media_load(format!("{e:#}")))?;

    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(StagecastError::media_load("svg has invalid width/height"));
    }
    let fit = (SVG_MAX_DIM as f32 / w.max(h)).min(1.0);
    let width = ((w * fit).ceil() as u32).max(1);
    let height = ((h * fit).ceil() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StagecastError::media_load("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(width as f32 / w, height as f32 / h);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: pixmap.data().to_vec(),
    })
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StagecastResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StagecastError::media_load("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StagecastError::media_load("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StagecastError::media_load("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}
