use super::*;
use serde_json::json;

fn button(id: &str, cx: f64, cy: f64) -> ElementDef {
    serde_json::from_value(json!({
        "id": id, "type": "button", "label": id,
        "x": cx - 40.0, "y": cy - 20.0, "width": 80, "height": 40,
        "action": {"kind": "url", "url": format!("https://example.test/{id}")}
    }))
    .unwrap()
}

fn nav(elements: &[ElementDef]) -> FocusNavigator {
    let mut n = FocusNavigator::new(FocusConfig::default());
    n.initialize_navigation(elements);
    n
}

fn focused(n: &FocusNavigator) -> &str {
    n.focused_element().map(|c| c.id.as_str()).unwrap_or("")
}

#[test]
fn vertical_pair_moves_down_and_up_only() {
    let mut n = nav(&[button("B", 100.0, 300.0), button("A", 100.0, 100.0)]);
    assert_eq!(focused(&n), "A");
    assert!(!n.move_focus(Direction::Left));
    assert!(!n.move_focus(Direction::Right));
    assert_eq!(focused(&n), "A");
    assert!(n.move_focus(Direction::Down));
    assert_eq!(focused(&n), "B");
    assert!(!n.move_focus(Direction::Down));
    assert!(n.move_focus(Direction::Up));
    assert_eq!(focused(&n), "A");
}

#[test]
fn rows_cluster_within_threshold_then_sort_by_x() {
    let n = nav(&[
        button("right", 400.0, 130.0),
        button("left", 100.0, 100.0),
        button("below", 50.0, 300.0),
        button("mid", 250.0, 140.0),
    ]);
    let order: Vec<&str> = n.candidates().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, ["left", "mid", "right", "below"]);
}

#[test]
fn dead_zone_excludes_nearly_aligned_candidates() {
    let mut n = nav(&[button("a", 100.0, 100.0), button("b", 115.0, 400.0)]);
    assert_eq!(focused(&n), "a");
    // b is only 15 px to the right: inside the 20 px dead zone.
    assert!(!n.move_focus(Direction::Right));
    assert!(n.move_focus(Direction::Down));
}

#[test]
fn nearest_candidate_wins() {
    let mut n = nav(&[
        button("origin", 100.0, 100.0),
        button("near", 300.0, 120.0),
        button("far", 600.0, 100.0),
    ]);
    assert!(n.move_focus(Direction::Right));
    assert_eq!(focused(&n), "near");
}

#[test]
fn hidden_and_non_interactive_elements_are_ignored() {
    let mut hidden = button("hidden", 100.0, 500.0);
    hidden.visible = false;
    let text: ElementDef = serde_json::from_value(json!({
        "id": "t", "type": "text", "x": 0, "y": 0, "width": 10, "height": 10
    }))
    .unwrap();
    let n = nav(&[button("only", 100.0, 100.0), hidden, text]);
    assert_eq!(n.candidates().len(), 1);
}

#[test]
fn execute_returns_the_focused_action_and_cleanup_clears() {
    let mut n = nav(&[button("A", 100.0, 100.0)]);
    assert_eq!(
        n.execute_action(),
        Some(ActionDef::Url {
            url: "https://example.test/A".into()
        })
    );
    n.cleanup();
    assert!(n.focused_element().is_none());
    assert!(n.execute_action().is_none());
    assert!(!n.move_focus(Direction::Down));
}
