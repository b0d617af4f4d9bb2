use super::*;

fn style(size_px: f32) -> TextStyle {
    TextStyle {
        size_px,
        bold: false,
        letter_spacing_px: 0.0,
        line_height_px: None,
    }
}

#[test]
fn shaping_without_font_is_platform_unavailable() {
    let mut engine = TextLayoutEngine::empty();
    assert!(!engine.has_font());
    let err = engine.shape("HELLO", style(16.0), None).err().unwrap();
    assert!(matches!(err, StagecastError::PlatformUnavailable(_)));
}

#[test]
fn invalid_size_is_rejected_before_font_lookup() {
    let mut engine = TextLayoutEngine::empty();
    let err = engine.shape("x", style(0.0), None).err().unwrap();
    assert!(matches!(err, StagecastError::Config(_)));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut engine = TextLayoutEngine::empty();
    assert!(engine.register_regular(b"definitely not a font".to_vec()).is_err());
    assert!(!engine.has_font());
}

#[test]
fn system_font_shapes_glyphs_when_available() {
    let mut engine = TextLayoutEngine::discover(None, None);
    if !engine.has_font() {
        return;
    }
    let shaped = engine.shape("HELLO", style(20.0), None).unwrap();
    assert_eq!(shaped.lines.len(), 1);
    assert_eq!(shaped.lines[0].glyphs.len(), 5);
    assert!(shaped.width() > 0.0);
    assert!(shaped.height() > 0.0);
}

#[test]
fn wrapping_produces_multiple_lines_when_available() {
    let mut engine = TextLayoutEngine::discover(None, None);
    if !engine.has_font() {
        return;
    }
    let shaped = engine
        .shape("alpha beta gamma delta epsilon", style(20.0), Some(60.0))
        .unwrap();
    assert!(shaped.lines.len() > 1);
}

#[test]
fn absolute_line_height_overrides_metrics_when_available() {
    let mut engine = TextLayoutEngine::discover(None, None);
    if !engine.has_font() {
        return;
    }
    let mut s = style(20.0);
    s.line_height_px = Some(50.0);
    let shaped = engine.shape("a", s, None).unwrap();
    assert_eq!(shaped.height(), 50.0);
}
