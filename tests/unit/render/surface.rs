use super::*;

#[test]
fn zero_sized_surface_is_config_error() {
    assert!(matches!(
        RasterSurface::new(0, 10),
        Err(StagecastError::Config(_))
    ));
    assert!(RasterSurface::new(70_000, 10).is_err());
}

#[test]
fn fill_rect_clips_to_surface() {
    let mut s = RasterSurface::new(4, 4).unwrap();
    s.fill_rect(PixelRect::new(2, 2, 10, 10), Rgba8Premul::black());
    assert_eq!(s.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(3, 3), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(4, 4), None);
}

#[test]
fn composite_over_respects_clip() {
    let mut s = RasterSurface::new(4, 1).unwrap();
    s.fill(Rgba8Premul::black());

    let mut src = vello_cpu::Pixmap::new(4, 1);
    for px in src.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&[255, 255, 255, 255]);
    }
    s.composite_over(&src, (0, 0), PixelRect::new(1, 0, 3, 1)).unwrap();

    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(1, 0), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(2, 0), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(3, 0), Some([0, 0, 0, 255]));
}

#[test]
fn composite_over_places_a_small_source_at_its_origin() {
    let mut s = RasterSurface::new(6, 3).unwrap();
    s.fill(Rgba8Premul::black());

    let mut src = vello_cpu::Pixmap::new(2, 2);
    for px in src.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&[0, 255, 0, 255]);
    }
    s.composite_over(&src, (3, 1), PixelRect::from_size(6, 3)).unwrap();

    assert_eq!(s.pixel(2, 1), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(3, 1), Some([0, 255, 0, 255]));
    assert_eq!(s.pixel(4, 2), Some([0, 255, 0, 255]));
    assert_eq!(s.pixel(5, 1), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(3, 0), Some([0, 0, 0, 255]));
}

#[test]
fn half_transparent_over_blends() {
    let mut s = RasterSurface::new(1, 1).unwrap();
    s.fill(Rgba8Premul::black());
    s.fill_rect_over(
        PixelRect::new(0, 0, 1, 1),
        Rgba8Premul::from_straight_rgba(255, 255, 255, 128),
    );
    assert_eq!(s.pixel(0, 0), Some([128, 128, 128, 255]));
}

#[test]
fn frame_unpremultiplies_for_export() {
    let mut s = RasterSurface::new(1, 1).unwrap();
    s.fill(Rgba8Premul::from_straight_rgba(200, 100, 0, 128));
    let f = s.to_frame();
    assert!(f.premultiplied);
    let straight = f.to_straight_rgba();
    assert_eq!(straight[3], 128);
    assert!((i32::from(straight[0]) - 200).abs() <= 1);
    assert!((i32::from(straight[1]) - 100).abs() <= 1);
}
