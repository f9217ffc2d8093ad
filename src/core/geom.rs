//! Plane geometry helpers for the fold math.
//!
//! Everything works on `kurbo` points in page-local coordinates: origin at
//! the spine end of the page, x growing toward the outer edge, y downward.

use kurbo::{Point, Rect, Vec2};

/// A line through two points. Only the direction matters; callers clip the
/// resulting intersection to a bounding rect themselves.
pub type Line = (Point, Point);

/// Closed-interval point-in-rect test (kurbo's `contains` is half-open,
/// which would drop hits landing exactly on the far border of the page).
pub fn point_in_rect(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Rotate `p` around `origin` by `angle` radians, clockwise in screen
/// coordinates (y grows downward).
pub fn rotate_around(p: Point, origin: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    Point::new(
        p.x * cos + p.y * sin + origin.x,
        p.y * cos - p.x * sin + origin.y,
    )
}

/// Intersection of the infinite lines through `a` and `b`, kept only if it
/// falls inside `bounds`. Returns `None` for parallel lines or an
/// out-of-bounds hit.
pub fn line_intersection_in(bounds: Rect, a: Line, b: Line) -> Option<Point> {
    // Line through (p, q) as Ax + By + C = 0.
    let coeffs = |l: Line| {
        (
            l.0.y - l.1.y,
            l.1.x - l.0.x,
            l.0.x * l.1.y - l.1.x * l.0.y,
        )
    };
    let (a1, b1, c1) = coeffs(a);
    let (a2, b2, c2) = coeffs(b);

    let det = a1 * b2 - a2 * b1;
    if det.abs() < 1e-9 {
        return None;
    }

    let hit = Point::new((b1 * c2 - b2 * c1) / det, (a2 * c1 - a1 * c2) / det);
    point_in_rect(bounds, hit).then_some(hit)
}

/// Pull `p` back onto the circle of `radius` around `center` if it lies
/// outside; points already inside pass through untouched.
pub fn limit_to_circle(center: Point, radius: f64, p: Point) -> Point {
    let v = p - center;
    let dist = v.hypot();
    if dist <= radius {
        return p;
    }
    center + v * (radius / dist)
}

/// Discretize the segment `from → to` into one point per unit of travel
/// along the dominant axis. The first element is `from` and the last lands
/// exactly on `to`, so an animation consuming these frames finishes at its
/// destination.
pub fn line_points(from: Point, to: Point) -> Vec<Point> {
    let span = (from.x - to.x).abs().max((from.y - to.y).abs());
    let steps = (span.ceil() as usize).max(1);

    let mut points = Vec::with_capacity(steps + 1);
    points.push(from);
    for i in 1..=steps {
        points.push(from.lerp(to, i as f64 / steps as f64));
    }
    points
}

/// Even-odd point-in-polygon test over a closed vertex loop (the last
/// vertex connects back to the first). Fewer than three vertices contain
/// nothing.
pub fn point_in_polygon(polygon: &[Point], p: Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_hit = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_hit {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Unsigned angle between two lines, in `[0, π]`.
pub fn angle_between_lines(a: Line, b: Line) -> f64 {
    let na = Vec2::new(a.0.y - a.1.y, a.1.x - a.0.x);
    let nb = Vec2::new(b.0.y - b.1.y, b.1.x - b.0.x);
    let denom = na.hypot() * nb.hypot();
    if denom == 0.0 {
        return 0.0;
    }
    (na.dot(nb) / denom).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn rotate_by_zero_is_translation_only() {
        let p = rotate_around(Point::new(3.0, 4.0), Point::new(10.0, 20.0), 0.0);
        assert!(approx(p, Point::new(13.0, 24.0)));
    }

    #[test]
    fn rotate_quarter_turn_maps_x_axis_onto_negative_y() {
        // Screen coordinates: a clockwise quarter turn lifts +x to -y.
        let p = rotate_around(Point::new(1.0, 0.0), Point::ZERO, FRAC_PI_2);
        assert!(approx(p, Point::new(0.0, -1.0)));
    }

    #[test]
    fn crossing_lines_intersect_inside_bounds() {
        let bounds = Rect::new(-1.0, -1.0, 11.0, 11.0);
        let hit = line_intersection_in(
            bounds,
            (Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            (Point::new(0.0, 10.0), Point::new(10.0, 0.0)),
        );
        assert!(approx(hit.unwrap(), Point::new(5.0, 5.0)));
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let bounds = Rect::new(-100.0, -100.0, 100.0, 100.0);
        let hit = line_intersection_in(
            bounds,
            (Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            (Point::new(0.0, 5.0), Point::new(10.0, 5.0)),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn intersection_outside_bounds_is_dropped() {
        let bounds = Rect::new(0.0, 0.0, 4.0, 4.0);
        let hit = line_intersection_in(
            bounds,
            (Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(10.0, 0.0), Point::new(0.0, 10.0)),
        );
        // Lines meet at (5, 5), outside the 4x4 bounds.
        assert!(hit.is_none());
    }

    #[test]
    fn boundary_hit_is_kept() {
        let bounds = Rect::new(0.0, 0.0, 5.0, 5.0);
        let hit = line_intersection_in(
            bounds,
            (Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(10.0, 0.0), Point::new(0.0, 10.0)),
        );
        assert!(approx(hit.unwrap(), Point::new(5.0, 5.0)));
    }

    #[test]
    fn points_inside_circle_pass_through() {
        let p = Point::new(3.0, 0.0);
        assert!(approx(limit_to_circle(Point::ZERO, 5.0, p), p));
    }

    #[test]
    fn points_outside_circle_land_on_it() {
        let limited = limit_to_circle(Point::ZERO, 5.0, Point::new(10.0, 0.0));
        assert!(approx(limited, Point::new(5.0, 0.0)));

        let diagonal = limit_to_circle(Point::ZERO, 5.0, Point::new(30.0, 40.0));
        assert!((diagonal.to_vec2().hypot() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn limit_handles_vertical_displacement() {
        let limited = limit_to_circle(Point::new(2.0, 2.0), 3.0, Point::new(2.0, 50.0));
        assert!(approx(limited, Point::new(2.0, 5.0)));
    }

    #[test]
    fn line_points_hits_both_endpoints() {
        let from = Point::new(0.0, 0.0);
        let to = Point::new(10.0, 4.0);
        let pts = line_points(from, to);
        assert_eq!(pts.len(), 11); // one per unit of the dominant axis
        assert!(approx(pts[0], from));
        assert!(approx(*pts.last().unwrap(), to));
    }

    #[test]
    fn line_points_degenerate_segment_still_reaches_destination() {
        let p = Point::new(2.0, 2.0);
        let pts = line_points(p, Point::new(2.0, 2.5));
        assert!(approx(*pts.last().unwrap(), Point::new(2.0, 2.5)));
    }

    #[test]
    fn line_points_steps_are_monotonic_in_x() {
        let pts = line_points(Point::new(100.0, 0.0), Point::new(-100.0, 50.0));
        for pair in pts.windows(2) {
            assert!(pair[1].x < pair[0].x);
        }
    }

    #[test]
    fn polygon_test_separates_inside_from_outside() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(&square, Point::new(5.0, 5.0)));
        assert!(point_in_polygon(&square, Point::new(0.5, 9.5)));
        assert!(!point_in_polygon(&square, Point::new(-0.5, 5.0)));
        assert!(!point_in_polygon(&square, Point::new(5.0, 10.5)));
    }

    #[test]
    fn polygon_test_respects_concave_notches() {
        // An L-shape: the notch occupies the top-right quadrant.
        let ell = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(&ell, Point::new(2.0, 2.0)));
        assert!(point_in_polygon(&ell, Point::new(8.0, 8.0)));
        assert!(!point_in_polygon(&ell, Point::new(8.0, 2.0)));
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        assert!(!point_in_polygon(&[], Point::ZERO));
        let segment = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert!(!point_in_polygon(&segment, Point::new(5.0, 5.0)));
    }

    #[test]
    fn angle_between_perpendicular_lines_is_right() {
        let a = (Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = (Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        assert!((angle_between_lines(a, b) - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn angle_between_parallel_lines_is_flat() {
        let a = (Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = (Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        let angle = angle_between_lines(a, b);
        assert!(angle.abs() < 1e-9 || (angle - PI).abs() < 1e-9);
    }
}
