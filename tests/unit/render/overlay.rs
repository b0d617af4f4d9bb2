use super::*;

fn video(id: &str, z: i64, rect: Rect) -> OverlayNode {
    OverlayNode {
        id: id.to_owned(),
        rect,
        rotation: 0.0,
        opacity: 1.0,
        z_index: z,
        visible: true,
        plane: OverlayPlane::Above,
        content: OverlayContent::Video {
            src: "clip.mp4".to_owned(),
            looping: true,
            muted: true,
            autoplay: true,
            fit: ImageFit::Cover,
        },
    }
}

#[test]
fn upsert_replaces_instead_of_duplicating() {
    let mut layer = OverlayLayer::new();
    layer.upsert(video("v", 0, Rect::new(0.0, 0.0, 10.0, 10.0)));
    layer.upsert(video("v", 0, Rect::new(5.0, 5.0, 20.0, 20.0)));
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.get("v").unwrap().rect.x0, 5.0);
    assert_eq!(layer.upsert_count(), 2);
}

#[test]
fn toggles_report_missing_nodes() {
    let mut layer = OverlayLayer::new();
    assert!(!layer.set_visible("nope", true));
    layer.upsert(video("v", 0, Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert!(layer.set_visible("v", false));
    assert!(!layer.get("v").unwrap().visible);
    assert!(layer.set_opacity("v", 4.0));
    assert_eq!(layer.get("v").unwrap().opacity, 1.0);
    assert!(layer.remove("v"));
    assert!(layer.is_empty());
}

#[test]
fn nodes_are_back_to_front() {
    let mut layer = OverlayLayer::new();
    layer.upsert(video("top", 5, Rect::new(0.0, 0.0, 1.0, 1.0)));
    layer.upsert(video("low", 1, Rect::new(0.0, 0.0, 1.0, 1.0)));
    let mut bg = video("bg", 100, Rect::new(0.0, 0.0, 1.0, 1.0));
    bg.plane = OverlayPlane::Below;
    layer.upsert(bg);
    let ids = layer.nodes().iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["bg", "low", "top"]);
}

#[test]
fn preview_puts_below_nodes_under_transparent_raster() {
    let mut layer = OverlayLayer::new();
    let mut bg = video("bg", 0, Rect::new(0.0, 0.0, 2.0, 1.0));
    bg.plane = OverlayPlane::Below;
    layer.upsert(bg);

    let raster = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![0, 0, 0, 0, 255, 0, 0, 255],
        premultiplied: true,
    };
    let out = layer.composite_preview(&raster);
    assert_eq!(out.pixel(0, 0), Some([24, 24, 24, 255]));
    assert_eq!(out.pixel(1, 0), Some([255, 0, 0, 255]));
}

#[test]
fn serializes_with_kind_tags() {
    let mut layer = OverlayLayer::new();
    layer.upsert(video("v", 0, Rect::new(0.0, 0.0, 1.0, 1.0)));
    let json = layer.to_json().unwrap();
    assert!(json.contains("\"kind\": \"video\""));
    assert!(json.contains("\"zIndex\": 0"));
}
