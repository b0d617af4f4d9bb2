use super::*;
use serde_json::json;

fn element(rotation: f64) -> ElementDef {
    serde_json::from_value(json!({
        "id": "e", "type": "rectangle",
        "x": 100, "y": 50, "width": 40, "height": 20, "rotation": rotation
    }))
    .unwrap()
}

#[test]
fn unrotated_bounds_match_geometry() {
    let b = element_bounds(&element(0.0));
    assert_eq!(b, Rect::new(100.0, 50.0, 140.0, 70.0));
    assert_eq!(element_pixel_bounds(&element(0.0)), PixelRect::new(100, 50, 140, 70));
}

#[test]
fn rotation_is_about_the_element_center() {
    let b = element_bounds(&element(90.0));
    assert!((b.center().x - 120.0).abs() < 1e-9);
    assert!((b.center().y - 60.0).abs() < 1e-9);
    assert!((b.width() - 20.0).abs() < 1e-9);
    assert!((b.height() - 40.0).abs() < 1e-9);
}

#[test]
fn fit_rect_modes() {
    let dst = Rect::new(0.0, 0.0, 200.0, 100.0);
    assert_eq!(fit_rect(100.0, 100.0, dst, ImageFit::Fill), dst);
    assert_eq!(
        fit_rect(100.0, 100.0, dst, ImageFit::Contain),
        Rect::new(50.0, 0.0, 150.0, 100.0)
    );
    assert_eq!(
        fit_rect(100.0, 100.0, dst, ImageFit::Cover),
        Rect::new(0.0, -50.0, 200.0, 150.0)
    );
    assert_eq!(
        fit_rect(10.0, 10.0, dst, ImageFit::None),
        Rect::new(95.0, 45.0, 105.0, 55.0)
    );
}

#[test]
fn rounded_rect_radius_is_clamped() {
    let p = rounded_rect_path(10.0, 4.0, 100.0);
    let bb = p.bounding_box();
    assert!((bb.width() - 10.0).abs() < 1e-6);
    assert!((bb.height() - 4.0).abs() < 1e-6);
}

#[test]
fn vignette_is_clear_in_the_middle_and_dark_at_corners() {
    let pm = vignette_pixmap(20, 20, 1.0, ColorDef::black());
    let bytes = pm.data_as_u8_slice();
    let center = (10 * 20 + 10) * 4;
    assert_eq!(bytes[center + 3], 0);
    assert!(bytes[3] > 128);
}
