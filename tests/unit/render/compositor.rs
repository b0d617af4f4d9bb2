use super::*;
use crate::assets::loader::ManualLoader;
use crate::foundation::time::FixedClock;
use crate::navigation::action::RecordingActionHost;
use crate::render::background::{BACKGROUND_VIDEO_ID, SimulatedPlayer};
use crate::render::overlay::{OverlayContent, OverlayPlane};
use crate::scene::model::ImageFit;
use crate::scene::store::InMemoryTemplateStore;
use crate::scene::template::Template;
use serde_json::json;
use std::time::Duration;

const BG: [u8; 4] = [0x10, 0x20, 0x30, 0xff];
const RED: [u8; 4] = [0xff, 0x00, 0x00, 0xff];
const BLUE: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

struct Rig {
    c: Compositor,
    loader: ManualLoader,
    clock: FixedClock,
    store: Arc<InMemoryTemplateStore>,
}

fn scene(canvas: serde_json::Value, elements: serde_json::Value) -> Template {
    let mut canvas = canvas;
    if let Some(obj) = canvas.as_object_mut() {
        obj.entry("width").or_insert(json!(100));
        obj.entry("height").or_insert(json!(100));
    }
    Template::from_value(json!({"canvas": canvas, "elements": elements})).unwrap()
}

fn color_scene(elements: serde_json::Value) -> Template {
    scene(json!({"backgroundType": "color", "background": "#102030"}), elements)
}

fn rig(template: Template, width: u32, height: u32) -> Rig {
    let store = Arc::new(InMemoryTemplateStore::new(template));
    let loader = ManualLoader::new();
    let clock = FixedClock::from_millis(1_700_000_000_000);
    let mut c = Compositor::new(store.clone(), EngineConfig::default())
        .with_loader(Box::new(loader.handle()))
        .with_clock(Arc::new(clock.clone()))
        .with_text_engine(TextLayoutEngine::empty())
        .with_local_offset(FixedOffset::east_opt(0).unwrap());
    c.attach_host(HostSurface::new("test", width, height).unwrap());
    Rig {
        c,
        loader,
        clock,
        store,
    }
}

fn px(c: &Compositor, x: u32, y: u32) -> [u8; 4] {
    c.host().unwrap().surface().pixel(x, y).unwrap()
}

fn rect(id: &str, z: i64, x: u32, y: u32, w: u32, h: u32, fill: &str) -> serde_json::Value {
    json!({"id": id, "type": "rectangle", "zIndex": z, "x": x, "y": y, "width": w, "height": h, "fillColor": fill})
}

fn button(id: &str, y: u32, action: serde_json::Value) -> serde_json::Value {
    json!({"id": id, "type": "button", "label": id, "x": 10, "y": y, "width": 80, "height": 30, "action": action})
}

#[test]
fn render_without_a_host_is_platform_unavailable() {
    let store = Arc::new(InMemoryTemplateStore::new(color_scene(json!([]))));
    let mut c = Compositor::new(store, EngineConfig::default()).with_text_engine(TextLayoutEngine::empty());
    let err = c.render().unwrap_err();
    assert!(matches!(err, StagecastError::PlatformUnavailable(_)));
    assert_eq!(c.phase(), RenderPhase::Idle);
}

#[test]
fn empty_store_is_a_config_error_and_keeps_the_previous_frame() {
    let mut r = rig(color_scene(json!([])), 40, 40);
    r.c.render().unwrap();
    assert_eq!(px(&r.c, 5, 5), BG);

    r.store.clear();
    let err = r.c.render().unwrap_err();
    assert!(matches!(err, StagecastError::Config(_)));
    assert_eq!(px(&r.c, 5, 5), BG);
}

#[test]
fn invalid_template_replaces_the_frame_with_a_failure_panel() {
    let t = scene(
        json!({"width": -100, "backgroundType": "color", "background": "#102030"}),
        json!([rect("a", 0, 0, 0, 10, 10, "#ff0000")]),
    );
    let mut r = rig(t, 100, 50);
    let err = r.c.render().unwrap_err();
    assert!(matches!(err, StagecastError::Config(_)));
    assert!(r.c.session().is_none());
    assert_eq!(px(&r.c, 50, 25), [0x5a, 0x16, 0x16, 0xff]);
    assert_eq!(px(&r.c, 2, 2), [0, 0, 0, 0xff]);
}

#[test]
fn element_problems_degrade_instead_of_failing_the_scene() {
    let t = color_scene(json!([
        {"id": "logo", "type": "image", "src": "  ", "x": 10, "y": 10, "width": 30, "height": 30},
        {"id": "title", "type": "text", "content": "HELLO", "x": 50, "y": 10, "width": 40, "height": 20},
        rect("title", 0, 50, 60, 10, 10, "#ff0000"),
        {"id": "ghost", "type": "rectangle", "x": 0, "y": 0, "width": -5, "height": 10, "fillColor": "#00ff00"}
    ]));
    let mut r = rig(t, 100, 100);
    let report = r.c.render().unwrap();
    assert_eq!(report.elements, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
    assert!(r.c.session().is_some());

    assert_eq!(px(&r.c, 95, 95), BG);
    assert_eq!(px(&r.c, 2, 2), BG);
    assert_eq!(px(&r.c, 28, 14), [0x3a, 0x3a, 0x3a, 0xff]);
    assert_eq!(px(&r.c, 55, 65), RED);
    assert!(!r.c.has_pending_loads());
}

#[test]
fn color_scene_renders_in_stacking_order() {
    let t = color_scene(json!([
        rect("top", 2, 10, 10, 50, 50, "#ff0000"),
        rect("under", 1, 30, 30, 60, 60, "#0000ff")
    ]));
    let mut r = rig(t, 100, 100);
    let report = r.c.render().unwrap();
    assert_eq!(report.elements, 2);
    assert_eq!(report.failed, 0);
    assert!(!report.deferred);

    assert_eq!(px(&r.c, 5, 5), BG);
    assert_eq!(px(&r.c, 40, 40), RED);
    assert_eq!(px(&r.c, 80, 80), BLUE);

    let ids: Vec<&str> = r.c.session().unwrap().elements().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["under", "top"]);
    assert_eq!(
        r.c.phase_history(),
        [
            RenderPhase::LoadTemplate,
            RenderPhase::ComputeScale,
            RenderPhase::SortElements,
            RenderPhase::DetermineBackgroundMode,
            RenderPhase::BackgroundSync,
            RenderPhase::RenderElements,
            RenderPhase::ScheduleLiveTick,
            RenderPhase::Idle,
        ]
    );
}

#[test]
fn equal_stacking_index_keeps_document_order() {
    let mut elements = vec![
        serde_json::from_value::<ElementDef>(rect("b", 1, 0, 0, 1, 1, "#000")).unwrap(),
        serde_json::from_value::<ElementDef>(rect("a", 1, 0, 0, 1, 1, "#000")).unwrap(),
        serde_json::from_value::<ElementDef>(rect("c", 0, 0, 0, 1, 1, "#000")).unwrap(),
    ];
    sort_by_stacking(&mut elements);
    let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["c", "b", "a"]);
}

#[test]
fn image_background_defers_elements_until_it_loads() {
    let t = scene(
        json!({"backgroundType": "image", "backgroundImage": "bg.png", "background": "#102030"}),
        json!([rect("r", 0, 0, 0, 20, 20, "#ff0000")]),
    );
    let mut r = rig(t, 100, 100);
    let report = r.c.render().unwrap();
    assert!(report.deferred);
    assert!(r.c.phase_history().contains(&RenderPhase::BackgroundAsync));
    assert!(!r.c.phase_history().contains(&RenderPhase::RenderElements));
    assert!(!r.c.session().unwrap().elements_rendered());
    assert_ne!(px(&r.c, 10, 10), RED);

    let pending = r.loader.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].purpose, LoadPurpose::Background);

    r.loader.resolve_all_solid(4, 4, [0, 255, 0, 255]);
    let pumped = r.c.pump(Instant::now());
    assert_eq!(pumped.completions, 1);
    assert!(r.c.session().unwrap().elements_rendered());
    assert_eq!(px(&r.c, 10, 10), RED);
    assert_eq!(px(&r.c, 50, 50), [0, 255, 0, 255]);
}

#[test]
fn failed_background_image_still_renders_elements() {
    let t = scene(
        json!({"backgroundType": "image", "backgroundImage": "missing.png", "background": "#102030"}),
        json!([rect("r", 0, 0, 0, 20, 20, "#ff0000")]),
    );
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    r.loader
        .resolve("missing.png", Err(StagecastError::media_load("404")));
    r.c.pump(Instant::now());
    assert!(r.c.session().unwrap().elements_rendered());
    assert_eq!(px(&r.c, 10, 10), RED);
}

#[test]
fn element_image_completion_repaints_only_its_region() {
    let t = color_scene(json!([
        {"id": "img", "type": "image", "src": "a.png", "x": 10, "y": 10, "width": 20, "height": 20},
        rect("r", 0, 60, 60, 20, 20, "#ff0000")
    ]));
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    assert_eq!(px(&r.c, 20, 20), BG);
    assert!(r.c.has_pending_loads());
    let before = r.c.host().unwrap().frame();

    r.loader.resolve("a.png", Ok(crate::assets::loader::solid_image(2, 2, [255, 255, 0, 255])));
    let pumped = r.c.pump(Instant::now());
    assert_eq!(pumped.completions, 1);
    assert!(!r.c.has_pending_loads());

    let after = r.c.host().unwrap().frame();
    assert_eq!(after.pixel(20, 20), Some([255, 255, 0, 255]));
    for y in 0..100 {
        for x in 0..100 {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                continue;
            }
            assert_eq!(after.pixel(x, y), before.pixel(x, y), "pixel {x},{y} changed");
        }
    }
}

#[test]
fn completions_for_an_old_scene_are_ignored() {
    let t = color_scene(json!([
        {"id": "img", "type": "image", "src": "a.png", "x": 0, "y": 0, "width": 20, "height": 20}
    ]));
    let mut r = rig(t, 40, 40);
    r.c.render().unwrap();
    r.c.render().unwrap();
    assert_eq!(r.loader.pending().len(), 2);

    r.loader.resolve_all_solid(1, 1, [255, 0, 0, 255]);
    let pumped = r.c.pump(Instant::now());
    assert_eq!(pumped.stale, 1);
    assert_eq!(pumped.completions, 1);
}

#[test]
fn cleanup_invalidates_loads_and_is_idempotent() {
    let t = color_scene(json!([
        {"id": "img", "type": "image", "src": "a.png", "x": 0, "y": 0, "width": 20, "height": 20},
        button("b", 50, json!({"kind": "url", "url": "https://example.test"}))
    ]));
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    assert!(!r.c.host().unwrap().overlay().is_empty());

    r.c.cleanup();
    r.c.cleanup();
    assert!(r.c.session().is_none());
    assert!(r.c.host().unwrap().overlay().is_empty());
    assert!(r.c.focused_element().is_none());

    r.loader.resolve_all_solid(1, 1, [255, 0, 0, 255]);
    let pumped = r.c.pump(Instant::now());
    assert_eq!(pumped.stale, 1);
    assert_eq!(px(&r.c, 5, 5), BG);
}

#[test]
fn live_tick_repaint_reproduces_the_full_render() {
    let t = color_scene(json!([
        rect("panel", 0, 0, 0, 100, 50, "#334455"),
        {"id": "clk", "type": "clock", "zIndex": 1, "x": 10, "y": 10, "width": 50, "height": 30,
         "backgroundColor": "#aa0000", "borderRadius": 6}
    ]));
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    assert!(r.c.is_animating());
    assert_eq!(r.c.live_rects(), vec![PixelRect::new(8, 8, 62, 42)]);
    let before = r.c.host().unwrap().frame();

    let t0 = Instant::now();
    let first = r.c.pump(t0);
    assert!(first.ticked);
    assert_eq!(first.live_repainted, 1);
    assert_eq!(r.c.host().unwrap().frame(), before);

    assert!(!r.c.pump(t0 + Duration::from_millis(10)).ticked);
    r.clock.advance_millis(1000);
    assert!(r.c.pump(t0 + Duration::from_millis(1000)).ticked);
    assert_eq!(r.c.update_clocks(), 1);
}

#[test]
fn live_repaint_stays_inside_each_element_clip() {
    // Two live boxes one pixel apart: each full-render paint is clipped to the padded bounds a
    // tick restores, so the tick reproduces the frame exactly.
    let t = color_scene(json!([
        rect("panel", 0, 0, 0, 100, 60, "#334455"),
        {"id": "clk", "type": "clock", "zIndex": 1, "x": 10, "y": 10, "width": 40, "height": 30,
         "backgroundColor": "#aa0000"},
        {"id": "tmr", "type": "timer", "zIndex": 1, "x": 51, "y": 10, "width": 40, "height": 30,
         "backgroundColor": "#0000ff"}
    ]));
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    assert_eq!(r.c.live_rects().len(), 2);
    let full = r.c.host().unwrap().frame();
    assert_eq!(px(&r.c, 50, 20), [0x33, 0x44, 0x55, 0xff]);
    assert_eq!(px(&r.c, 51, 20), BLUE);

    let report = r.c.pump(Instant::now());
    assert_eq!(report.live_repainted, 2);
    assert_eq!(report.repaint_failures, 0);
    assert_eq!(r.c.host().unwrap().frame(), full);
}

#[test]
fn failing_live_repaints_are_counted() {
    let t = color_scene(json!([
        {"id": "clk", "type": "clock", "x": 10, "y": 10, "width": 50, "height": 30, "fontSize": 1e40}
    ]));
    let mut r = rig(t, 100, 100);
    let report = r.c.render().unwrap();
    assert_eq!(report.failed, 1);

    let t0 = Instant::now();
    let tick = r.c.pump(t0);
    assert!(tick.ticked);
    assert_eq!(tick.repaint_failures, 1);
    r.clock.advance_millis(1000);
    assert_eq!(r.c.pump(t0 + Duration::from_millis(1000)).repaint_failures, 1);
    assert_eq!(r.c.session().unwrap().repaint_failures(), 2);
    assert_eq!(px(&r.c, 95, 95), BG);
}

#[test]
fn unreferenced_images_are_evicted_on_the_next_scene() {
    let img = |src: &str| json!([{"id": "img", "type": "image", "src": src, "x": 0, "y": 0, "width": 20, "height": 20}]);
    let mut r = rig(color_scene(img("a.png")), 40, 40);
    r.c.render().unwrap();
    r.loader.resolve_all_solid(1, 1, [255, 0, 0, 255]);
    r.c.pump(Instant::now());
    assert!(r.c.images.ready("a.png").is_some());

    // Same source again: kept and drawn without a new load.
    r.c.render().unwrap();
    assert!(!r.c.has_pending_loads());
    assert_eq!(px(&r.c, 5, 5), RED);

    r.store.replace(color_scene(img("b.png")));
    r.c.render().unwrap();
    assert!(r.c.images.ready("a.png").is_none());
    assert_eq!(r.c.images.len(), 1);
    assert!(r.c.has_pending_loads());
}

#[test]
fn teardown_leaves_host_overlay_nodes_alone() {
    let t = color_scene(json!([
        button("b", 50, json!({"kind": "url", "url": "https://example.test"})),
        {"id": "clip", "type": "video", "src": "clip.mp4", "x": 0, "y": 0, "width": 40, "height": 30}
    ]));
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    r.c.host_mut().unwrap().overlay_mut().upsert(OverlayNode {
        id: "host:badge".to_owned(),
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        rotation: 0.0,
        opacity: 1.0,
        z_index: 99,
        visible: true,
        plane: OverlayPlane::Above,
        content: OverlayContent::AnimatedImage {
            src: "badge.gif".to_owned(),
            fit: ImageFit::Contain,
        },
    });
    assert!(r.c.host().unwrap().overlay().get("focus:b").is_some());
    assert!(r.c.host().unwrap().overlay().get("clip").is_some());

    r.c.cleanup();
    let ids: Vec<String> = r
        .c
        .host()
        .unwrap()
        .overlay()
        .nodes()
        .iter()
        .map(|n| n.id.clone())
        .collect();
    assert_eq!(ids, vec!["host:badge".to_owned()]);
}

#[test]
fn scene_without_live_elements_does_not_tick() {
    let mut r = rig(color_scene(json!([rect("r", 0, 0, 0, 10, 10, "#ff0000")])), 20, 20);
    r.c.render().unwrap();
    assert!(!r.c.is_animating());
    assert!(!r.c.pump(Instant::now()).ticked);
}

#[test]
fn video_background_moves_live_elements_to_the_overlay() {
    let t = scene(
        json!({"backgroundType": "video", "backgroundVideo": "loop.mp4"}),
        json!([{"id": "clk", "type": "clock", "x": 10, "y": 10, "width": 50, "height": 30}]),
    );
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();
    assert!(r.c.is_animating());
    assert_eq!(px(&r.c, 30, 20), [0, 0, 0, 0]);

    let text_of = |c: &Compositor| match &c.host().unwrap().overlay().get("clk").unwrap().content {
        OverlayContent::LiveText { text, .. } => text.clone(),
        other => panic!("unexpected content {other:?}"),
    };
    assert_eq!(text_of(&r.c), "22:13:20");
    assert!(r.c.host().unwrap().overlay().get(BACKGROUND_VIDEO_ID).is_some());

    let before = r.c.host().unwrap().frame();
    let t0 = Instant::now();
    let first = r.c.pump(t0);
    assert!(first.ticked);
    assert_eq!(first.live_repainted, 1);
    r.clock.advance_millis(1000);
    assert!(r.c.pump(t0 + Duration::from_millis(1000)).ticked);
    assert_eq!(text_of(&r.c), "22:13:21");
    r.clock.advance_millis(1000);
    assert_eq!(r.c.update_clocks(), 1);
    assert_eq!(text_of(&r.c), "22:13:22");
    assert_eq!(r.c.host().unwrap().frame(), before);

    let fitted = r.c.on_background_video_metadata(1920, 1080).unwrap();
    assert!((fitted.height() - 100.0).abs() < 1e-9);
    assert!(fitted.x0 < 0.0);
}

#[test]
fn cleanup_removes_the_background_video_node() {
    let t = scene(json!({"backgroundType": "video", "backgroundVideo": "loop.mp4"}), json!([]));
    let mut r = rig(t, 40, 40);
    r.c.render().unwrap();
    assert!(r.c.host().unwrap().overlay().get(BACKGROUND_VIDEO_ID).is_some());
    r.c.cleanup();
    assert!(r.c.host().unwrap().overlay().is_empty());
}

#[test]
fn stalled_background_video_is_restarted() {
    let t = scene(json!({"backgroundType": "video", "backgroundVideo": "loop.mp4"}), json!([]));
    let mut r = rig(t, 40, 40);
    r.c.render().unwrap();
    let player = SimulatedPlayer::new(30.0);
    r.c.attach_background_player(Box::new(player.clone()));
    player.stall();

    let t0 = Instant::now();
    let actions: Vec<_> = (0..4)
        .map(|i| r.c.pump(t0 + Duration::from_millis(1000 * i)).watchdog)
        .collect();
    assert_eq!(
        actions,
        [
            Some(WatchdogAction::Healthy),
            Some(WatchdogAction::Stalled(1)),
            Some(WatchdogAction::Stalled(2)),
            Some(WatchdogAction::Restarted),
        ]
    );
    assert_eq!(player.seeks(), [0.0]);
}

#[test]
fn focus_rings_follow_navigation() {
    let none = json!({"kind": "url", "url": "https://example.test"});
    let t = color_scene(json!([button("A", 10, none.clone()), button("B", 60, none)]));
    let mut r = rig(t, 100, 100);
    r.c.render().unwrap();

    let visible = |c: &Compositor, id: &str| {
        c.host()
            .unwrap()
            .overlay()
            .get(&OverlayNode::focus_id(id))
            .map(|n| n.visible)
    };
    assert_eq!(r.c.focused_element(), Some("A"));
    assert_eq!(visible(&r.c, "A"), Some(true));
    assert_eq!(visible(&r.c, "B"), Some(false));

    let before = r.c.host().unwrap().frame();
    assert!(r.c.move_focus(Direction::Down));
    assert_eq!(visible(&r.c, "A"), Some(false));
    assert_eq!(visible(&r.c, "B"), Some(true));
    assert_eq!(r.c.host().unwrap().frame(), before);

    assert!(!r.c.move_focus(Direction::Down));
    assert_eq!(r.c.focused_element(), Some("B"));
}

#[test]
fn template_action_renders_the_linked_template() {
    let t = color_scene(json!([button("go", 10, json!({"kind": "template", "templateId": "next"}))]));
    let mut r = rig(t, 40, 40);
    r.c.render().unwrap();
    let first = r.c.session().unwrap().token();

    let linked = Arc::new(InMemoryTemplateStore::empty());
    linked.insert_linked(
        "next",
        scene(json!({"backgroundType": "color", "background": "#ff00ff"}), json!([])),
    );
    let mut host = RecordingActionHost::new().with_linked_store(linked);
    let outcome = r.c.execute_focused(&mut host).unwrap();

    assert_eq!(outcome, ActionOutcome::TemplateRendered("next".into()));
    assert_eq!(host.fetched, ["next"]);
    assert!(r.c.session().unwrap().token() > first);
    assert_eq!(px(&r.c, 5, 5), [0xff, 0x00, 0xff, 0xff]);
    assert!(r.c.focused_element().is_none());
}

#[test]
fn launch_action_goes_to_the_host() {
    let t = color_scene(json!([button(
        "tv",
        10,
        json!({"kind": "launchApp", "package": "com.example.tv"})
    )]));
    let mut r = rig(t, 40, 40);
    r.c.render().unwrap();
    let mut host = RecordingActionHost::new();
    assert_eq!(
        r.c.execute_focused(&mut host).unwrap(),
        ActionOutcome::Launched("com.example.tv".into())
    );
    assert_eq!(host.launched, ["com.example.tv"]);
}

#[test]
fn nothing_focused_without_interactive_elements() {
    let mut r = rig(color_scene(json!([])), 20, 20);
    r.c.render().unwrap();
    let mut host = RecordingActionHost::new();
    assert_eq!(r.c.execute_focused(&mut host).unwrap(), ActionOutcome::NothingFocused);
}

#[test]
fn animation_loop_can_be_stopped_and_restarted() {
    let t = color_scene(json!([{"id": "clk", "type": "timer", "x": 0, "y": 0, "width": 40, "height": 20}]));
    let mut r = rig(t, 40, 40);
    r.c.render().unwrap();
    r.c.stop_animation_loop();
    let t0 = Instant::now();
    assert!(!r.c.pump(t0).ticked);

    r.c.start_animation_loop(t0 + Duration::from_millis(500));
    assert!(!r.c.pump(t0).ticked);
    assert!(r.c.pump(t0 + Duration::from_millis(500)).ticked);
}

#[test]
fn overlay_geometry_follows_the_measured_container() {
    let t = color_scene(json!([
        {"id": "v", "type": "video", "src": "clip.mp4", "x": 10, "y": 10, "width": 20, "height": 20}
    ]));
    let mut r = rig(t, 100, 100);
    r.c.host_mut().unwrap().set_measured_size(101, 101);
    r.c.render().unwrap();
    let node = |c: &Compositor| c.host().unwrap().overlay().get("v").unwrap().rect;
    assert_eq!(node(&r.c), Rect::new(10.0, 10.0, 30.0, 30.0));

    r.c.host_mut().unwrap().set_measured_size(200, 200);
    r.c.render().unwrap();
    assert_eq!(node(&r.c), Rect::new(20.0, 20.0, 60.0, 60.0));
}

#[test]
fn detached_host_stops_rendering() {
    let mut r = rig(color_scene(json!([])), 20, 20);
    r.c.render().unwrap();
    let host = r.c.detach_host().unwrap();
    assert_eq!(host.name(), "test");
    assert!(r.c.session().is_none());
    assert!(matches!(r.c.render(), Err(StagecastError::PlatformUnavailable(_))));
}
