use std::path::{Path, PathBuf};

use crate::foundation::error::{StagecastError, StagecastResult};

/// Fonts tried when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/system/fonts/Roboto-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const SYSTEM_BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/system/fonts/Roboto-Bold.ttf",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Style inputs for one shaping call, already in device pixels.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextStyle {
    pub(crate) size_px: f32,
    pub(crate) bold: bool,
    pub(crate) letter_spacing_px: f32,
    /// Absolute line advance; the font's natural line height when `None`.
    pub(crate) line_height_px: Option<f32>,
}

/// One laid-out line; glyph `x` is relative to the line start, `y` to the line baseline.
#[derive(Clone, Debug)]
pub(crate) struct ShapedLine {
    pub(crate) glyphs: Vec<vello_cpu::Glyph>,
    pub(crate) width: f32,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) line_height: f32,
}

impl ShapedLine {
    /// Baseline offset from the top of this line's box, centering the glyph extent in it.
    pub(crate) fn baseline(&self) -> f32 {
        (self.line_height - (self.ascent + self.descent)) / 2.0 + self.ascent
    }
}

/// Shaped text ready for painting.
#[derive(Clone)]
pub(crate) struct ShapedText {
    pub(crate) lines: Vec<ShapedLine>,
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) size_px: f32,
}

impl ShapedText {
    pub(crate) fn width(&self) -> f32 {
        self.lines.iter().map(|l| l.width).fold(0.0, f32::max)
    }

    pub(crate) fn height(&self) -> f32 {
        self.lines.iter().map(|l| l.line_height).sum()
    }
}

/// Parley-backed shaper holding the regular (and optional bold) face.
///
/// Without any usable font the engine still constructs; [`TextLayoutEngine::shape`] then returns
/// `PlatformUnavailable` and text-bearing elements skip their glyphs.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular: Option<LoadedFont>,
    bold: Option<LoadedFont>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::empty()
    }
}

impl TextLayoutEngine {
    /// Engine with no fonts registered.
    pub fn empty() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            regular: None,
            bold: None,
        }
    }

    /// Load the configured font, falling back to well-known system locations.
    pub fn discover(font_path: Option<&Path>, bold_font_path: Option<&Path>) -> Self {
        let mut engine = Self::empty();

        let regular = font_path
            .map(Path::to_path_buf)
            .or_else(|| first_existing(SYSTEM_FONT_CANDIDATES));
        match regular {
            Some(p) => match std::fs::read(&p) {
                Ok(bytes) => {
                    if let Err(e) = engine.register_regular(bytes) {
                        tracing::warn!(path = %p.display(), error = %e, "font rejected");
                    }
                }
                Err(e) => tracing::warn!(path = %p.display(), error = %e, "font unreadable"),
            },
            None => tracing::warn!("no usable font found; text will not be drawn"),
        }

        let bold = bold_font_path
            .map(Path::to_path_buf)
            .or_else(|| first_existing(SYSTEM_BOLD_CANDIDATES));
        if let Some(p) = bold
            && let Ok(bytes) = std::fs::read(&p)
            && let Err(e) = engine.register_bold(bytes)
        {
            tracing::debug!(path = %p.display(), error = %e, "bold font rejected");
        }

        engine
    }

    pub fn has_font(&self) -> bool {
        self.regular.is_some()
    }

    pub fn register_regular(&mut self, bytes: Vec<u8>) -> StagecastResult<()> {
        self.regular = Some(self.register(bytes)?);
        Ok(())
    }

    pub fn register_bold(&mut self, bytes: Vec<u8>) -> StagecastResult<()> {
        self.bold = Some(self.register(bytes)?);
        Ok(())
    }

    fn register(&mut self, bytes: Vec<u8>) -> StagecastResult<LoadedFont> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StagecastError::config("no font families registered from font bytes"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StagecastError::config("registered font family has no name"))?
            .to_string();
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        Ok(LoadedFont { family, data })
    }

    /// Shape `text`, wrapping at `max_width_px` when given.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        style: TextStyle,
        max_width_px: Option<f32>,
    ) -> StagecastResult<ShapedText> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(StagecastError::config("text size must be finite and > 0"));
        }
        let font = match (style.bold, &self.bold, &self.regular) {
            (true, Some(b), _) => b,
            (_, _, Some(r)) => r,
            _ => return Err(StagecastError::platform("no font registered")),
        };
        let family = font.family.clone();
        let font_data = font.data.clone();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::default()));
        if style.letter_spacing_px != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                style.letter_spacing_px,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        layout.align(
            max_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let mut lines = Vec::new();
        for line in layout.lines() {
            let m = line.metrics();
            let line_start = m.offset;
            let mut glyphs = Vec::new();
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x - line_start,
                    y: g.y - m.baseline,
                }));
            }
            let natural = m.ascent + m.descent + m.leading;
            lines.push(ShapedLine {
                glyphs,
                width: (m.advance - m.trailing_whitespace).max(0.0),
                ascent: m.ascent,
                descent: m.descent,
                line_height: style.line_height_px.unwrap_or(natural).max(1.0),
            });
        }

        Ok(ShapedText {
            lines,
            font: font_data,
            size_px: style.size_px,
        })
    }
}

fn first_existing(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
