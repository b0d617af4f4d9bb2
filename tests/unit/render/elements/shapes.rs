use super::*;

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn polygon_starts_straight_up() {
    let v = polygon_vertices(6, Point::new(50.0, 50.0), 10.0);
    assert_eq!(v.len(), 6);
    assert!(approx(v[0], Point::new(50.0, 40.0)));
    // Hexagon with a vertex up has another straight down.
    assert!(approx(v[3], Point::new(50.0, 60.0)));
}

#[test]
fn pentagon_vertices_are_equidistant() {
    let c = Point::new(0.0, 0.0);
    for p in polygon_vertices(5, c, 7.0) {
        assert!((p.distance(c) - 7.0).abs() < 1e-9);
    }
}

#[test]
fn star_alternates_outer_and_inner_radius() {
    let c = Point::new(10.0, 10.0);
    let v = star_vertices(5, c, 10.0, 0.5);
    assert_eq!(v.len(), 10);
    for (i, p) in v.iter().enumerate() {
        let expected = if i % 2 == 0 { 10.0 } else { 5.0 };
        assert!((p.distance(c) - expected).abs() < 1e-9, "vertex {i}");
    }
    assert!(approx(v[0], Point::new(10.0, 0.0)));
}

#[test]
fn polygon_radius_uses_the_shorter_side() {
    let body = ShapeBody::default();
    let bb = shape_path(ElementKind::Hexagon, &body, 200.0, 100.0, None).bounding_box();
    assert!((bb.height() - 100.0).abs() < 1e-6);
    assert!(bb.width() < 100.0);
}

#[test]
fn arrows_stay_inside_their_box() {
    for dir in [
        ArrowDirection::Right,
        ArrowDirection::Left,
        ArrowDirection::Up,
        ArrowDirection::Down,
    ] {
        let body = ShapeBody {
            direction: dir,
            ..ShapeBody::default()
        };
        let bb = shape_path(ElementKind::Arrow, &body, 120.0, 40.0, None).bounding_box();
        assert!(bb.x0 >= -1e-9 && bb.y0 >= -1e-9, "{dir:?} {bb:?}");
        assert!(bb.x1 <= 120.0 + 1e-9 && bb.y1 <= 40.0 + 1e-9, "{dir:?} {bb:?}");
    }
}

#[test]
fn up_arrow_tip_is_at_the_top() {
    let body = ShapeBody {
        direction: ArrowDirection::Up,
        ..ShapeBody::default()
    };
    let path = shape_path(ElementKind::Arrow, &body, 40.0, 120.0, None);
    let tip = path
        .elements()
        .iter()
        .filter_map(|el| el.end_point())
        .min_by(|a, b| a.y.total_cmp(&b.y))
        .unwrap();
    assert!(approx(tip, Point::new(20.0, 0.0)));
}

#[test]
fn triangle_is_isosceles_with_apex_on_top() {
    let path = shape_path(ElementKind::Triangle, &ShapeBody::default(), 10.0, 20.0, None);
    let pts: Vec<Point> = path.elements().iter().filter_map(|el| el.end_point()).collect();
    assert!(approx(pts[0], Point::new(5.0, 0.0)));
    assert!(approx(pts[1], Point::new(10.0, 20.0)));
    assert!(approx(pts[2], Point::new(0.0, 20.0)));
}
