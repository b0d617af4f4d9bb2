use std::str::FromStr;

use crate::foundation::error::StagecastError;
use crate::scene::model::{ElementBody, ElementDef, StyleDef, TemplateDef};

/// Policy for mapping design space onto the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Uniform `min` scale; the whole design is visible.
    #[default]
    Fit,
    /// Uniform `max` scale; the design covers the screen and may crop.
    Fill,
    /// Independent X/Y scale; may distort.
    Stretch,
}

impl FromStr for FitMode {
    type Err = StagecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fit" | "contain" | "letterbox" => Ok(Self::Fit),
            "fill" | "cover" | "crop" => Ok(Self::Fill),
            "stretch" => Ok(Self::Stretch),
            other => Err(StagecastError::config(format!(
                "unknown fit mode '{other}' (expected fit, fill or stretch)"
            ))),
        }
    }
}

/// Line heights at or below this are multipliers of the font size rather than pixels.
pub(crate) const LINE_HEIGHT_MULTIPLIER_MAX: f64 = 4.0;

/// Design-space to device-pixel mapping for one full render.
///
/// The scaled design is anchored at the screen origin: positions are `floor(v * scale)` and sizes
/// `ceil(v * scale)` so adjacent elements never leave seams.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ScaleContext {
    pub screen_width: u32,
    pub screen_height: u32,
    pub design_width: f64,
    pub design_height: f64,
    pub mode: FitMode,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ScaleContext {
    /// Derive scale factors. A zero (or unusable) design dimension falls back to the screen
    /// dimension, giving identity scale on that axis.
    pub fn initialize(
        screen_width: u32,
        screen_height: u32,
        design_width: f64,
        design_height: f64,
        mode: FitMode,
    ) -> Self {
        let sw = f64::from(screen_width);
        let sh = f64::from(screen_height);
        let dw = if design_width.is_finite() && design_width > 0.0 {
            design_width
        } else {
            sw
        };
        let dh = if design_height.is_finite() && design_height > 0.0 {
            design_height
        } else {
            sh
        };
        let (rx, ry) = if dw > 0.0 && dh > 0.0 {
            (sw / dw, sh / dh)
        } else {
            (1.0, 1.0)
        };
        let (scale_x, scale_y) = match mode {
            FitMode::Fit => {
                let s = rx.min(ry);
                (s, s)
            }
            FitMode::Fill => {
                let s = rx.max(ry);
                (s, s)
            }
            FitMode::Stretch => (rx, ry),
        };
        Self {
            screen_width,
            screen_height,
            design_width: dw,
            design_height: dh,
            mode,
            scale_x,
            scale_y,
        }
    }

    pub fn identity(screen_width: u32, screen_height: u32) -> Self {
        Self::initialize(
            screen_width,
            screen_height,
            f64::from(screen_width),
            f64::from(screen_height),
            FitMode::Stretch,
        )
    }

    /// Scale used for anything that must not distort.
    pub fn uniform(&self) -> f64 {
        self.scale_x.min(self.scale_y)
    }

    pub fn x(&self, v: f64) -> f64 {
        (v * self.scale_x).floor()
    }

    pub fn y(&self, v: f64) -> f64 {
        (v * self.scale_y).floor()
    }

    pub fn width(&self, v: f64) -> f64 {
        (v * self.scale_x).ceil()
    }

    pub fn height(&self, v: f64) -> f64 {
        (v * self.scale_y).ceil()
    }

    /// Font size, letter spacing, absolute line height.
    pub fn metric(&self, v: f64) -> f64 {
        (v * self.uniform()).round()
    }

    /// Strokes never vanish on downscale: any nonzero width stays at least one device pixel.
    pub fn stroke(&self, v: f64) -> f64 {
        if v > 0.0 {
            (v * self.uniform()).round().max(1.0)
        } else {
            0.0
        }
    }

    pub fn radius(&self, v: f64) -> f64 {
        (v * self.uniform()).round()
    }

    pub fn scale_element(&self, e: &ElementDef) -> ElementDef {
        let mut out = e.clone();
        out.x = self.x(e.x);
        out.y = self.y(e.y);
        out.width = self.width(e.width);
        out.height = self.height(e.height);
        out.style = self.scale_style(&e.style);

        if let Some(shape) = out.body.shape_mut() {
            shape.stroke_width = self.stroke(shape.stroke_width);
        }
        if let ElementBody::Ticker(t) = &mut out.body {
            t.speed *= self.scale_x;
        }
        out
    }

    fn scale_style(&self, s: &StyleDef) -> StyleDef {
        let pad_x = s.padding_x();
        let pad_y = s.padding_y();
        let has_padding = s.padding.is_some() || s.padding_x.is_some() || s.padding_y.is_some();
        StyleDef {
            border_width: s.border_width.map(|v| self.stroke(v)),
            border_radius: s.border_radius.map(|v| self.radius(v)),
            padding: None,
            padding_x: has_padding.then(|| (pad_x * self.scale_x).round()),
            padding_y: has_padding.then(|| (pad_y * self.scale_y).round()),
            font_size: s.font_size.map(|v| self.metric(v)),
            letter_spacing: s.letter_spacing.map(|v| self.metric(v)),
            line_height: s.line_height.map(|v| {
                if v > LINE_HEIGHT_MULTIPLIER_MAX {
                    self.metric(v)
                } else {
                    v
                }
            }),
            ..s.clone()
        }
    }

    /// Scale every element and replace the canvas dimensions with the screen dimensions.
    pub fn scale_template_data(&self, def: &TemplateDef) -> TemplateDef {
        let mut canvas = def.canvas.clone();
        canvas.width = f64::from(self.screen_width);
        canvas.height = f64::from(self.screen_height);
        TemplateDef {
            canvas,
            elements: def.elements.iter().map(|e| self.scale_element(e)).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/scaler.rs"]
mod tests;
