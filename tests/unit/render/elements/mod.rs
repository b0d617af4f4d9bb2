use super::*;
use crate::foundation::core::{PixelRect, Rgba8Premul};
use crate::render::overlay::{OverlayHost, OverlayLayer};
use crate::render::surface::RasterSurface;
use crate::render::target::{RasterScratch, RasterTarget};
use chrono::TimeZone;
use serde_json::json;

fn element(v: serde_json::Value) -> ElementDef {
    serde_json::from_value(v).unwrap()
}

fn one_of_each() -> Vec<ElementDef> {
    let geo = |id: &str, ty: &str| json!({"id": id, "type": ty, "x": 2, "y": 2, "width": 40, "height": 20});
    ElementKind::ALL
        .iter()
        .map(|k| {
            let mut v = geo(k.as_str(), k.as_str());
            let extra = match k {
                ElementKind::Countdown => json!({"targetTime": "2030-01-01T00:00:00Z"}),
                ElementKind::Image | ElementKind::AnimatedImage | ElementKind::Video => {
                    json!({"src": "media/x.png"})
                }
                _ => json!({}),
            };
            if let (Some(obj), Some(extra)) = (v.as_object_mut(), extra.as_object()) {
                obj.extend(extra.clone());
            }
            element(v)
        })
        .collect()
}

#[test]
fn table_routes_every_kind_to_a_renderer_that_accepts_it() {
    let mut text = TextLayoutEngine::empty();
    let images = ImageCache::new();
    let mut requests = Vec::new();
    let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let mut ctx = RenderCtx {
        now,
        activated_at: now,
        local_offset: FixedOffset::east_opt(0).unwrap(),
        text: &mut text,
        images: &images,
        requests: Some(&mut requests),
        token: SessionToken(1),
    };
    let mut surface = RasterSurface::new(64, 32).unwrap();
    let mut scratch = RasterScratch::new(64, 32);
    let mut layer = OverlayLayer::new();
    for e in one_of_each() {
        let mut target = RasterTarget::new(
            &mut surface,
            &mut scratch,
            PixelRect::from_size(64, 32),
            Some(&mut layer),
        );
        render_isolated(&mut ctx, &e, &mut target)
            .unwrap_or_else(|err| panic!("{}: {err}", e.kind()));
    }
    // Image queued a load; overlay kinds and interactive focus rings became nodes.
    assert_eq!(requests.len(), 1);
    assert!(layer.get("video").is_some());
    assert!(layer.get("ticker").is_some());
    assert!(!layer.get("focus:button").unwrap().visible);
}

#[test]
fn mismatched_body_is_a_config_error() {
    let mut text = TextLayoutEngine::empty();
    let images = ImageCache::new();
    let now = Utc.timestamp_millis_opt(0).unwrap();
    let mut ctx = RenderCtx {
        now,
        activated_at: now,
        local_offset: FixedOffset::east_opt(0).unwrap(),
        text: &mut text,
        images: &images,
        requests: None,
        token: SessionToken(1),
    };
    let rect = element(json!({"id": "r", "type": "rectangle", "x": 0, "y": 0, "width": 4, "height": 4}));
    let mut surface = RasterSurface::new(4, 4).unwrap();
    let mut scratch = RasterScratch::new(4, 4);
    let mut target = RasterTarget::new(&mut surface, &mut scratch, PixelRect::from_size(4, 4), None);
    let err = renderer_for(ElementKind::Clock)
        .render(&mut ctx, &rect, &mut target)
        .unwrap_err();
    assert!(matches!(err, StagecastError::Config(_)));
}

#[test]
fn invisible_elements_do_not_paint() {
    let mut text = TextLayoutEngine::empty();
    let images = ImageCache::new();
    let now = Utc.timestamp_millis_opt(0).unwrap();
    let mut ctx = RenderCtx {
        now,
        activated_at: now,
        local_offset: FixedOffset::east_opt(0).unwrap(),
        text: &mut text,
        images: &images,
        requests: None,
        token: SessionToken(1),
    };
    let e = element(json!({
        "id": "r", "type": "rectangle", "x": 0, "y": 0, "width": 4, "height": 4,
        "visible": false, "fillColor": "#ff0000"
    }));
    let mut surface = RasterSurface::new(4, 4).unwrap();
    surface.fill(Rgba8Premul::black());
    let mut scratch = RasterScratch::new(4, 4);
    let mut target = RasterTarget::new(&mut surface, &mut scratch, PixelRect::from_size(4, 4), None);
    render_isolated(&mut ctx, &e, &mut target).unwrap();
    assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 255]));
}

#[test]
fn image_requests_are_deduplicated_and_disabled_during_repaint() {
    let mut text = TextLayoutEngine::empty();
    let images = ImageCache::new();
    let mut requests = Vec::new();
    let now = Utc.timestamp_millis_opt(0).unwrap();
    {
        let mut ctx = RenderCtx {
            now,
            activated_at: now,
            local_offset: FixedOffset::east_opt(0).unwrap(),
            text: &mut text,
            images: &images,
            requests: Some(&mut requests),
            token: SessionToken(3),
        };
        assert!(ctx.request_image("a.png", "one"));
        assert!(ctx.request_image("a.png", "two"));
    }
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].token, SessionToken(3));

    let mut ctx = RenderCtx {
        now,
        activated_at: now,
        local_offset: FixedOffset::east_opt(0).unwrap(),
        text: &mut text,
        images: &images,
        requests: None,
        token: SessionToken(3),
    };
    assert!(!ctx.request_image("b.png", "three"));
}

#[test]
fn snow_weather_draws_its_cloud_glyph() {
    let mut text = TextLayoutEngine::empty();
    let images = ImageCache::new();
    let now = Utc.timestamp_millis_opt(0).unwrap();
    let mut ctx = RenderCtx {
        now,
        activated_at: now,
        local_offset: FixedOffset::east_opt(0).unwrap(),
        text: &mut text,
        images: &images,
        requests: None,
        token: SessionToken(1),
    };
    let e = element(json!({
        "id": "w", "type": "weather", "x": 0, "y": 0, "width": 120, "height": 40,
        "condition": "light snow", "temperature": -2.0, "location": "Oslo"
    }));
    let mut surface = RasterSurface::new(120, 40).unwrap();
    surface.fill(Rgba8Premul::black());
    let mut scratch = RasterScratch::new(120, 40);
    let mut target = RasterTarget::new(&mut surface, &mut scratch, PixelRect::from_size(120, 40), None);
    render_isolated(&mut ctx, &e, &mut target).unwrap();
    let cloud = [0xe6, 0xe9, 0xee, 0xff];
    let found = (0..40).any(|y| (0..120).any(|x| surface.pixel(x, y) == Some(cloud)));
    assert!(found, "no cloud pixels painted");
}
