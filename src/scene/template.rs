use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{StagecastError, StagecastResult};
use crate::scene::model::{BackgroundType, CanvasDef, ElementBody, ElementDef, TemplateDef};

/// Template boundary object.
///
/// Parsing is lenient per element: an element that fails to deserialize (unknown `type`, missing
/// geometry) is skipped with a warning so one bad element never blanks a screen. The canvas
/// itself must parse.
#[derive(Debug, Clone)]
pub struct Template {
    def: TemplateDef,
    skipped: usize,
}

impl Template {
    /// Parse a template from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StagecastResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| StagecastError::config(format!("parse template JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a template from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StagecastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StagecastError::config(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_json_str(s: &str) -> StagecastResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    pub fn from_value(mut value: serde_json::Value) -> StagecastResult<Self> {
        let obj = value
            .as_object_mut()
            .ok_or_else(|| StagecastError::config("template must be a JSON object"))?;
        let canvas_v = obj
            .remove("canvas")
            .ok_or_else(|| StagecastError::config("template has no canvas"))?;
        let canvas: CanvasDef = serde_json::from_value(canvas_v)
            .map_err(|e| StagecastError::config(format!("invalid canvas: {e}")))?;

        let raw = match obj.remove("elements") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(items)) => items,
            Some(_) => return Err(StagecastError::config("template elements must be an array")),
        };

        let mut elements = Vec::with_capacity(raw.len());
        let mut skipped = 0usize;
        for (i, item) in raw.into_iter().enumerate() {
            match serde_json::from_value::<ElementDef>(item) {
                Ok(e) => elements.push(e),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(index = i, error = %e, "skipping malformed element");
                }
            }
        }

        Ok(Self {
            def: TemplateDef { canvas, elements },
            skipped,
        })
    }

    pub fn from_def(def: TemplateDef) -> Self {
        Self { def, skipped: 0 }
    }

    pub fn def(&self) -> &TemplateDef {
        &self.def
    }

    pub fn canvas(&self) -> &CanvasDef {
        &self.def.canvas
    }

    pub fn elements(&self) -> &[ElementDef] {
        &self.def.elements
    }

    /// Number of elements dropped during lenient parsing.
    pub fn skipped_elements(&self) -> usize {
        self.skipped
    }

    pub fn element(&self, id: &str) -> Option<&ElementDef> {
        self.def.elements.iter().find(|e| e.id == id)
    }

    /// Canvas checks. A template that fails them cannot be laid out at all.
    ///
    /// Element and media problems are not errors here; see [`Template::issues`].
    pub fn validate(&self) -> StagecastResult<()> {
        let c = &self.def.canvas;
        if !c.width.is_finite() || !c.height.is_finite() || c.width < 0.0 || c.height < 0.0 {
            return Err(StagecastError::config(format!(
                "canvas size must be finite and non-negative, got {}x{}",
                c.width, c.height
            )));
        }
        if !c.background_opacity.is_finite() {
            return Err(StagecastError::config("canvas backgroundOpacity must be finite"));
        }
        Ok(())
    }

    /// Problems the renderer works around: a missing background source falls back to the solid
    /// fill, a media element without a source draws its placeholder, an element with unusable
    /// geometry is left out, and duplicate ids share one overlay node.
    pub fn issues(&self) -> Vec<TemplateIssue> {
        let c = &self.def.canvas;
        let mut out = Vec::new();
        match c.background_type {
            BackgroundType::Image if is_blank(c.background_image.as_deref()) => {
                out.push(TemplateIssue::canvas("backgroundType image without backgroundImage"));
            }
            BackgroundType::Video if is_blank(c.background_video.as_deref()) => {
                out.push(TemplateIssue::canvas("backgroundType video without backgroundVideo"));
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        for e in &self.def.elements {
            if !seen.insert(e.id.as_str()) {
                out.push(TemplateIssue::element(e, "duplicate element id"));
            }
            if !e.has_usable_geometry() {
                out.push(TemplateIssue::element(e, "non-finite geometry or negative size"));
            }
            let missing_src = match &e.body {
                ElementBody::Image(b) | ElementBody::AnimatedImage(b) => is_blank(Some(&b.src)),
                ElementBody::Video(b) => is_blank(Some(&b.src)),
                ElementBody::Slideshow(b) => b.images.iter().all(|s| s.trim().is_empty()),
                _ => false,
            };
            if missing_src {
                out.push(TemplateIssue::element(e, format!("{} element has no media source", e.kind())));
            }
        }
        out
    }
}

/// One non-fatal template problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateIssue {
    /// `None` for canvas-level issues.
    pub element_id: Option<String>,
    pub message: String,
}

impl TemplateIssue {
    fn canvas(message: impl Into<String>) -> Self {
        Self {
            element_id: None,
            message: message.into(),
        }
    }

    fn element(e: &ElementDef, message: impl Into<String>) -> Self {
        Self {
            element_id: Some(e.id.clone()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.element_id {
            Some(id) => write!(f, "element '{id}': {}", self.message),
            None => write!(f, "canvas: {}", self.message),
        }
    }
}

fn is_blank(s: Option<&str>) -> bool {
    s.is_none_or(|s| s.trim().is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/template.rs"]
mod tests;
