use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{PixelRect, Rgba8Premul};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::{premul_over_px, unpremultiply_rgba8_in_place};

/// A rendered frame as RGBA8 pixels.
///
/// Frames taken from a [`RasterSurface`] are premultiplied; the flag makes that explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy, the layout PNG encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> StagecastResult<()> {
        let path = path.as_ref();
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba())
            .ok_or_else(|| StagecastError::config("frame buffer size mismatch"))?;
        img.save(path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// The primary pixel-addressable drawing target: a premultiplied RGBA8 pixmap.
pub struct RasterSurface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> StagecastResult<Self> {
        let (w, h) = surface_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_size(self.width(), self.height())
    }

    /// Reallocate (cleared) when the host screen size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> StagecastResult<()> {
        if width != self.width() || height != self.height() {
            *self = Self::new(width, height)?;
        }
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn pixmap(&self) -> &vello_cpu::Pixmap {
        &self.pixmap
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        let px = self.data().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn fill(&mut self, color: Rgba8Premul) {
        let c = color.to_array();
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    /// Overwrite every pixel of `rect` (clipped to the surface) with `color`.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba8Premul) {
        let c = color.to_array();
        self.for_each_in(rect, |px| px.copy_from_slice(&c));
    }

    /// Source-over `color` onto every pixel of `rect`.
    pub fn fill_rect_over(&mut self, rect: PixelRect, color: Rgba8Premul) {
        let c = color.to_array();
        self.for_each_in(rect, |px| {
            let out = premul_over_px([px[0], px[1], px[2], px[3]], c);
            px.copy_from_slice(&out);
        });
    }

    pub fn clear_rect(&mut self, rect: PixelRect) {
        self.fill_rect(rect, Rgba8Premul::transparent());
    }

    /// Source-over `src`, whose top-left pixel sits at `origin`, touching only pixels inside
    /// `clip`.
    pub(crate) fn composite_over(
        &mut self,
        src: &vello_cpu::Pixmap,
        origin: (i32, i32),
        clip: PixelRect,
    ) -> StagecastResult<()> {
        let placed = PixelRect::new(
            origin.0,
            origin.1,
            origin.0 + i32::from(src.width()),
            origin.1 + i32::from(src.height()),
        );
        let r = clip.intersect(&self.bounds()).intersect(&placed);
        if r.is_empty() {
            return Ok(());
        }
        let stride = self.width() as usize * 4;
        let src_stride = usize::from(src.width()) * 4;
        let src_bytes = src.data_as_u8_slice();
        let dst_bytes = self.pixmap.data_as_u8_slice_mut();
        let span = r.width() as usize * 4;
        for y in r.y0..r.y1 {
            let a = y as usize * stride + r.x0 as usize * 4;
            let sa = (y - origin.1) as usize * src_stride + (r.x0 - origin.0) as usize * 4;
            for (d, s) in dst_bytes[a..a + span]
                .chunks_exact_mut(4)
                .zip(src_bytes[sa..sa + span].chunks_exact(4))
            {
                if s[3] == 0 {
                    continue;
                }
                let out = premul_over_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
        Ok(())
    }

    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    fn for_each_in(&mut self, rect: PixelRect, mut f: impl FnMut(&mut [u8])) {
        let r = rect.intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        let stride = self.width() as usize * 4;
        let bytes = self.pixmap.data_as_u8_slice_mut();
        for y in r.y0..r.y1 {
            let row = y as usize * stride;
            let a = row + r.x0 as usize * 4;
            let b = row + r.x1 as usize * 4;
            bytes[a..b].chunks_exact_mut(4).for_each(&mut f);
        }
    }
}

pub(crate) fn surface_dims(width: u32, height: u32) -> StagecastResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(StagecastError::config(format!(
            "surface size must be non-zero, got {width}x{height}"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| StagecastError::config("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StagecastError::config("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
