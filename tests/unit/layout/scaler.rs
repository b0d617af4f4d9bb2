use super::*;
use serde_json::json;

fn element(v: serde_json::Value) -> ElementDef {
    serde_json::from_value(v).unwrap()
}

fn sample() -> ElementDef {
    element(json!({
        "id": "t", "type": "text",
        "x": 33.3, "y": 17.7, "width": 101.1, "height": 40.2,
        "fontSize": 24, "letterSpacing": 2, "lineHeight": 30,
        "padding": 10, "borderWidth": 0.2, "borderRadius": 12,
        "content": "x"
    }))
}

#[test]
fn fit_uses_min_and_fill_uses_max() {
    let fit = ScaleContext::initialize(1280, 1080, 1920.0, 1080.0, FitMode::Fit);
    assert_eq!(fit.scale_x, 1280.0 / 1920.0);
    assert_eq!(fit.scale_x, fit.scale_y);

    let fill = ScaleContext::initialize(1280, 1080, 1920.0, 1080.0, FitMode::Fill);
    assert_eq!(fill.scale_x, 1.0);
    assert_eq!(fill.scale_y, 1.0);

    let stretch = ScaleContext::initialize(1280, 540, 1920.0, 1080.0, FitMode::Stretch);
    assert_eq!(stretch.scale_x, 1280.0 / 1920.0);
    assert_eq!(stretch.scale_y, 0.5);
}

#[test]
fn positions_floor_sizes_ceil() {
    for mode in [FitMode::Fit, FitMode::Fill, FitMode::Stretch] {
        let ctx = ScaleContext::initialize(1366, 768, 1920.0, 1080.0, mode);
        let e = sample();
        let s = ctx.scale_element(&e);
        assert_eq!(s.x, (e.x * ctx.scale_x).floor());
        assert_eq!(s.y, (e.y * ctx.scale_y).floor());
        assert_eq!(s.width, (e.width * ctx.scale_x).ceil());
        assert_eq!(s.height, (e.height * ctx.scale_y).ceil());
    }
}

#[test]
fn font_metrics_scale_uniformly_in_every_mode() {
    for mode in [FitMode::Fit, FitMode::Fill, FitMode::Stretch] {
        let ctx = ScaleContext::initialize(1280, 540, 1920.0, 1080.0, mode);
        let u = ctx.scale_x.min(ctx.scale_y);
        let s = ctx.scale_element(&sample());
        assert_eq!(s.style.font_size, Some((24.0 * u).round()));
        assert_eq!(s.style.letter_spacing, Some((2.0 * u).round()));
        assert_eq!(s.style.line_height, Some((30.0 * u).round()));
        assert_eq!(s.style.border_radius, Some((12.0 * u).round()));
    }
}

#[test]
fn padding_scales_per_axis() {
    let ctx = ScaleContext::initialize(960, 270, 1920.0, 1080.0, FitMode::Stretch);
    let s = ctx.scale_element(&sample());
    assert_eq!(s.style.padding_x(), 5.0);
    assert_eq!(s.style.padding_y(), 3.0);
}

#[test]
fn nonzero_stroke_never_vanishes() {
    let ctx = ScaleContext::initialize(192, 108, 1920.0, 1080.0, FitMode::Fit);
    let s = ctx.scale_element(&sample());
    assert_eq!(s.style.border_width, Some(1.0));
    assert_eq!(ctx.stroke(0.0), 0.0);

    let shape = element(json!({
        "id": "s", "type": "circle", "x": 0, "y": 0, "width": 10, "height": 10, "strokeWidth": 3
    }));
    let scaled = ctx.scale_element(&shape);
    assert_eq!(scaled.body.shape().unwrap().stroke_width, 1.0);
}

#[test]
fn multiplier_line_heights_are_left_alone() {
    let ctx = ScaleContext::initialize(960, 540, 1920.0, 1080.0, FitMode::Fit);
    let e = element(json!({
        "id": "t", "type": "text", "x": 0, "y": 0, "width": 10, "height": 10, "lineHeight": 1.4
    }));
    assert_eq!(ctx.scale_element(&e).style.line_height, Some(1.4));
}

#[test]
fn initialization_and_output_are_idempotent() {
    let a = ScaleContext::initialize(1366, 768, 1920.0, 1080.0, FitMode::Fit);
    let b = ScaleContext::initialize(1366, 768, 1920.0, 1080.0, FitMode::Fit);
    assert_eq!(a, b);
    let e = sample();
    let sa = serde_json::to_value(a.scale_element(&e)).unwrap();
    let sb = serde_json::to_value(b.scale_element(&e)).unwrap();
    assert_eq!(sa, sb);
}

#[test]
fn zero_design_dims_mean_identity() {
    let ctx = ScaleContext::initialize(1280, 720, 0.0, 0.0, FitMode::Fit);
    assert_eq!((ctx.scale_x, ctx.scale_y), (1.0, 1.0));
    let e = sample();
    assert_eq!(ctx.scale_element(&e).x, e.x.floor());
}

#[test]
fn template_canvas_takes_screen_dims() {
    let def: TemplateDef = serde_json::from_value(json!({
        "canvas": {"width": 1920, "height": 1080},
        "elements": [{"id": "a", "type": "rectangle", "x": 100, "y": 100, "width": 50, "height": 50}]
    }))
    .unwrap();
    let ctx = ScaleContext::initialize(960, 540, 1920.0, 1080.0, FitMode::Fit);
    let scaled = ctx.scale_template_data(&def);
    assert_eq!((scaled.canvas.width, scaled.canvas.height), (960.0, 540.0));
    assert_eq!(scaled.elements[0].x, 50.0);
    assert_eq!(scaled.elements[0].width, 25.0);
}

#[test]
fn fit_mode_parses_aliases() {
    assert_eq!("contain".parse::<FitMode>().unwrap(), FitMode::Fit);
    assert_eq!("FILL".parse::<FitMode>().unwrap(), FitMode::Fill);
    assert!("zoom".parse::<FitMode>().is_err());
}
