//! Fold geometry for one gesture instant.
//!
//! [`FlipCalc`] is parameterized once per gesture session (direction, grabbed
//! corner, page size) and then fed a stream of touch points. For each point
//! it models the turning page as a rigid sheet hinged at the spine:
//!
//!   1. constrain the touch to the arcs the paper can physically reach
//!      (radius `page_width` around the near spine corner, radius = page
//!      diagonal around the far one once the sheet crosses the spine),
//!   2. rotate the sheet's base rectangle around the constrained point by
//!      the fold angle,
//!   3. intersect the sheet's edges with the page rectangle to get the
//!      peeling silhouette (clip polygons) and the shadow line.
//!
//! All math happens in page-local coordinates: origin at the spine end of
//! the top edge, x toward the outer (grabbed) edge, y downward. The render
//! side mirrors x for backward turns before points arrive here, so the
//! calculator itself never cares which way the book opens.

use std::f64::consts::PI;

use kurbo::{Point, Rect};

use crate::core::geom;

/// Which way the book is being turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Toward higher page numbers (grabbing the right-hand page).
    Forward,
    /// Toward lower page numbers.
    Back,
}

/// Which corner of the page edge the user grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipCorner {
    Top,
    Bottom,
}

/// The rotated sheet of the turning page, tracked by its four corners in
/// page-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SheetRect {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

// Fold angles within this distance of π flatten the sheet onto the spine
// and make the silhouette numerically meaningless.
const FLAT_ANGLE_EPS: f64 = 0.003;

// A touch exactly on the grab corner's row folds at angle zero, leaving
// every crease line parallel to the page edges and the clip polygon
// degenerate. Touches landing there are stepped inside by this much.
const ZERO_RISE_NUDGE: f64 = 0.003;

/// Per-session geometric calculator. Accessors reflect the most recent
/// successful [`calc`](FlipCalc::calc).
#[derive(Debug, Clone)]
pub struct FlipCalc {
    direction: FlipDirection,
    corner: FlipCorner,
    page_width: f64,
    page_height: f64,

    /// Constrained touch position (the grabbed sheet corner).
    position: Point,
    /// Fold angle of the sheet, before direction signing.
    angle: f64,
    sheet: SheetRect,

    /// Where the sheet's edges cross the page's top / outer / bottom edge.
    top_intersect: Option<Point>,
    side_intersect: Option<Point>,
    bottom_intersect: Option<Point>,
}

impl FlipCalc {
    pub fn new(
        direction: FlipDirection,
        corner: FlipCorner,
        page_width: f64,
        page_height: f64,
    ) -> Self {
        Self {
            direction,
            corner,
            page_width,
            page_height,
            position: Point::new(page_width, 0.0),
            angle: 0.0,
            sheet: SheetRect::default(),
            top_intersect: None,
            side_intersect: None,
            bottom_intersect: None,
        }
    }

    /// Recompute the fold for `touch`. A `false` return means the input was
    /// degenerate (pivot-coincident or a flat fold) and every accessor still
    /// describes the previous frame; callers skip their render push.
    pub fn calc(&mut self, touch: Point) -> bool {
        match self.constrain_touch(touch) {
            Some((pos, angle, sheet)) => {
                self.position = pos;
                self.angle = angle;
                self.sheet = sheet;
                self.find_intersections();
                true
            }
            None => false,
        }
    }

    // ── accessors ──────────────────────────────────────────────

    pub fn direction(&self) -> FlipDirection {
        self.direction
    }

    pub fn corner(&self) -> FlipCorner {
        self.corner
    }

    /// Percentage of the turn completed, 0–100. Linear in the horizontal
    /// travel of the constrained touch across twice the page width.
    pub fn progress(&self) -> f64 {
        ((self.position.x - self.page_width) / (2.0 * self.page_width) * 100.0).abs()
    }

    /// Soft-bend rotation in radians, signed for the render direction.
    pub fn angle(&self) -> f64 {
        match self.direction {
            FlipDirection::Forward => -self.angle,
            FlipDirection::Back => self.angle,
        }
    }

    /// Rigid cover rotation in degrees: 180 at rest sweeping to 0 when the
    /// turn completes, mirrored negative for backward turns.
    pub fn hard_angle(&self) -> f64 {
        let sweep = 90.0 * (200.0 - 2.0 * self.progress()) / 100.0;
        match self.direction {
            FlipDirection::Forward => sweep,
            FlipDirection::Back => -sweep,
        }
    }

    /// Constrained touch position (the grabbed sheet corner).
    pub fn position(&self) -> Point {
        self.position
    }

    /// The rotated sheet rectangle.
    pub fn sheet(&self) -> SheetRect {
        self.sheet
    }

    /// Sheet corner the renderer anchors the turning page at.
    pub fn active_corner(&self) -> Point {
        match self.direction {
            FlipDirection::Forward => self.sheet.top_left,
            FlipDirection::Back => self.sheet.top_right,
        }
    }

    /// Draw origin of the stationary page being revealed underneath.
    pub fn bottom_page_position(&self) -> Point {
        match self.direction {
            FlipDirection::Back => Point::new(self.page_width, 0.0),
            FlipDirection::Forward => Point::ZERO,
        }
    }

    /// Visible silhouette of the turning page. Points that left the page
    /// rect are omitted; an empty polygon means nothing of the fold shows.
    pub fn flipping_clip(&self) -> Vec<Point> {
        let mut poly: Vec<Option<Point>> = Vec::with_capacity(5);
        let mut close_at_bottom = false;

        poly.push(Some(self.sheet.top_left));
        poly.push(self.top_intersect);

        match self.side_intersect {
            None => close_at_bottom = true,
            Some(side) => {
                poly.push(Some(side));
                if self.bottom_intersect.is_none() {
                    close_at_bottom = false;
                }
            }
        }

        poly.push(self.bottom_intersect);

        if close_at_bottom || self.corner == FlipCorner::Bottom {
            poly.push(Some(self.sheet.bottom_left));
        }

        poly.into_iter().flatten().collect()
    }

    /// Region of the under page exposed by the fold.
    pub fn bottom_clip(&self) -> Vec<Point> {
        let w = self.page_width;
        let h = self.page_height;
        let mut poly: Vec<Option<Point>> = Vec::with_capacity(6);

        poly.push(self.top_intersect);

        if self.corner == FlipCorner::Top {
            poly.push(Some(Point::new(w, 0.0)));
        } else {
            if self.top_intersect.is_some() {
                poly.push(Some(Point::new(w, 0.0)));
            }
            poly.push(Some(Point::new(w, h)));
        }

        match self.side_intersect {
            Some(side) => {
                // Degenerate slivers right at the corner flicker; drop the
                // side vertex until it separates from the top one.
                let gap = self
                    .top_intersect
                    .map_or(f64::INFINITY, |top| side.distance(top));
                if gap >= 10.0 {
                    poly.push(Some(side));
                }
            }
            None => {
                if self.corner == FlipCorner::Top {
                    poly.push(Some(Point::new(w, h)));
                }
            }
        }

        poly.push(self.bottom_intersect);
        poly.push(self.top_intersect);

        poly.into_iter().flatten().collect()
    }

    /// Anchor point of the fold shadow, when any part of the fold line is
    /// on the page.
    pub fn shadow_origin(&self) -> Option<Point> {
        match self.corner {
            FlipCorner::Top => self.top_intersect,
            FlipCorner::Bottom => self.side_intersect.or(self.top_intersect),
        }
    }

    /// Angle of the fold shadow against the top edge, mirrored for
    /// backward turns.
    pub fn shadow_angle(&self) -> f64 {
        let Some(line) = self.shadow_line() else {
            return 0.0;
        };
        let angle = geom::angle_between_lines(
            line,
            (Point::ZERO, Point::new(self.page_width, 0.0)),
        );
        match self.direction {
            FlipDirection::Forward => angle,
            FlipDirection::Back => PI - angle,
        }
    }

    // ── internals ──────────────────────────────────────────────

    fn shadow_line(&self) -> Option<geom::Line> {
        let first = self.shadow_origin()?;
        let second = match self.side_intersect {
            Some(side) if side != first => side,
            _ => self.bottom_intersect?,
        };
        Some((first, second))
    }

    /// The grabbed pivot corner in page-local coordinates.
    fn grab_corner(&self) -> Point {
        match self.corner {
            FlipCorner::Top => Point::new(self.page_width, 0.0),
            FlipCorner::Bottom => Point::new(self.page_width, self.page_height),
        }
    }

    /// Spine hinge nearest the grabbed corner, and the opposite one.
    fn hinges(&self) -> (Point, Point) {
        let top = Point::ZERO;
        let bottom = Point::new(0.0, self.page_height);
        match self.corner {
            FlipCorner::Top => (top, bottom),
            FlipCorner::Bottom => (bottom, top),
        }
    }

    /// Constrain the touch to reachable positions and derive the fold angle
    /// and rotated sheet for it. `None` marks the frame uncomputable.
    fn constrain_touch(&self, touch: Point) -> Option<(Point, f64, SheetRect)> {
        let (near_hinge, far_hinge) = self.hinges();

        let mut pos = touch;
        // On the corner's own row the fold goes flat; step it inside.
        let row = self.grab_corner().y;
        if pos.y == row {
            pos.y = match self.corner {
                FlipCorner::Top => row + ZERO_RISE_NUDGE,
                FlipCorner::Bottom => row - ZERO_RISE_NUDGE,
            };
        }
        let (mut angle, mut sheet) = self.fold_for(pos)?;

        // The grabbed corner stays within paper's reach of the near hinge.
        let limited = geom::limit_to_circle(near_hinge, self.page_width, pos);
        if limited != pos {
            pos = limited;
            (angle, sheet) = self.fold_for(pos)?;
        }

        // Once the sheet's far corner crosses the spine the whole sheet
        // swings from the far hinge; its reach there is the page diagonal.
        let far_corner = match self.corner {
            FlipCorner::Top => sheet.bottom_right,
            FlipCorner::Bottom => sheet.top_right,
        };
        if far_corner.x <= 0.0 {
            let diagonal = self.page_width.hypot(self.page_height);
            let pulled = geom::limit_to_circle(far_hinge, diagonal, pos);
            if pulled != pos {
                pos = pulled;
                (angle, sheet) = self.fold_for(pos)?;
            }
        }

        let grab = self.grab_corner();
        if (pos.x - grab.x).abs() < 1.0 && (pos.y - grab.y).abs() < 1.0 {
            return None; // pivot-coincident: zero-length fold
        }

        Some((pos, angle, sheet))
    }

    /// Fold angle and rotated sheet for a candidate position.
    fn fold_for(&self, pos: Point) -> Option<(f64, SheetRect)> {
        let angle = self.fold_angle(pos)?;
        Some((angle, self.rotated_sheet(pos, angle)))
    }

    /// The sheet's fold angle for a touch position: twice the angle between
    /// the crease and the page edge at the grabbed corner.
    fn fold_angle(&self, pos: Point) -> Option<f64> {
        // The +1 keeps the triangle non-degenerate at the very corner.
        let reach = self.page_width - pos.x + 1.0;
        let rise = match self.corner {
            FlipCorner::Top => pos.y,
            FlipCorner::Bottom => self.page_height - pos.y,
        };

        let mut angle = 2.0 * (reach / rise.hypot(reach)).acos();
        if rise < 0.0 {
            angle = -angle;
        }

        let to_flat = PI - angle;
        if !angle.is_finite() || (0.0..FLAT_ANGLE_EPS).contains(&to_flat) {
            return None;
        }

        if self.corner == FlipCorner::Bottom {
            angle = -angle;
        }
        Some(angle)
    }

    /// The base sheet rectangle (grabbed corner at the origin), rotated by
    /// the fold angle and translated to the touch position.
    fn rotated_sheet(&self, pos: Point, angle: f64) -> SheetRect {
        let w = self.page_width;
        let h = self.page_height;
        let base = match self.corner {
            FlipCorner::Top => [
                Point::ZERO,
                Point::new(w, 0.0),
                Point::new(0.0, h),
                Point::new(w, h),
            ],
            FlipCorner::Bottom => [
                Point::new(0.0, -h),
                Point::new(w, -h),
                Point::ZERO,
                Point::new(w, 0.0),
            ],
        };
        SheetRect {
            top_left: geom::rotate_around(base[0], pos, angle),
            top_right: geom::rotate_around(base[1], pos, angle),
            bottom_left: geom::rotate_around(base[2], pos, angle),
            bottom_right: geom::rotate_around(base[3], pos, angle),
        }
    }

    /// Where the sheet's edges cross the page's top, outer and bottom edge.
    /// Hits slightly outside the page still count (± 1 unit of slack) so
    /// the silhouette stays stable while the touch skims an edge.
    fn find_intersections(&mut self) {
        let w = self.page_width;
        let h = self.page_height;
        let bounds = Rect::new(-1.0, -1.0, w + 1.0, h + 1.0);

        let top_edge = (Point::ZERO, Point::new(w, 0.0));
        let outer_edge = (Point::new(w, 0.0), Point::new(w, h));
        let bottom_edge = (Point::new(0.0, h), Point::new(w, h));

        let (top_line, side_line): (geom::Line, geom::Line) = match self.corner {
            FlipCorner::Top => (
                (self.position, self.sheet.top_right),
                (self.position, self.sheet.bottom_left),
            ),
            FlipCorner::Bottom => (
                (self.sheet.top_left, self.sheet.top_right),
                (self.position, self.sheet.top_left),
            ),
        };
        let bottom_line = (self.sheet.bottom_left, self.sheet.bottom_right);

        self.top_intersect = geom::line_intersection_in(bounds, top_line, top_edge);
        self.side_intersect = geom::line_intersection_in(bounds, side_line, outer_edge);
        self.bottom_intersect = geom::line_intersection_in(bounds, bottom_line, bottom_edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 200.0;
    const H: f64 = 300.0;

    fn forward_top() -> FlipCalc {
        FlipCalc::new(FlipDirection::Forward, FlipCorner::Top, W, H)
    }

    #[test]
    fn progress_grows_monotonically_toward_the_spine() {
        let mut calc = forward_top();
        let mut last = -1.0;

        let mut x = W - 1.0;
        while x > -W {
            assert!(calc.calc(Point::new(x, 1.0)), "x={x}");
            let progress = calc.progress();
            assert!(
                progress >= last,
                "progress regressed at x={x}: {progress} < {last}"
            );
            assert!(progress <= 100.0);
            last = progress;
            x -= 10.0;
        }

        // A drag all the way past the spine approaches a full turn, and the
        // far edge itself reads as 100.
        assert!(last > 97.0, "expected near-complete turn, got {last}");
        assert!(calc.calc(Point::new(-W, 0.0)));
        assert!((calc.progress() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn progress_stays_partial_before_the_spine() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(0.0, 1.0)));
        assert!((calc.progress() - 50.0).abs() < 1.0);
        assert!(calc.calc(Point::new(100.0, 1.0)));
        assert!(calc.progress() < 50.0);
    }

    #[test]
    fn pivot_coincident_touch_is_rejected() {
        let mut calc = forward_top();
        assert!(!calc.calc(Point::new(W, 0.0)));
        assert!(!calc.calc(Point::new(W - 0.5, 0.5)));

        let mut bottom = FlipCalc::new(FlipDirection::Forward, FlipCorner::Bottom, W, H);
        assert!(!bottom.calc(Point::new(W, H)));
        assert!(!bottom.calc(Point::new(W - 0.4, H - 0.4)));
    }

    #[test]
    fn failed_calc_keeps_the_previous_frame() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(50.0, 40.0)));
        let before = (calc.position(), calc.progress());

        assert!(!calc.calc(Point::new(W, 0.0)));
        assert_eq!((calc.position(), calc.progress()), before);
    }

    #[test]
    fn points_outside_the_page_rect_still_compute() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(W + 50.0, -30.0)));
        assert!(calc.angle().is_finite());
        assert!(calc.progress().is_finite());
    }

    #[test]
    fn mid_fold_produces_clip_polygons() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(50.0, 40.0)));

        let flipping = calc.flipping_clip();
        let bottom = calc.bottom_clip();
        assert!(flipping.len() >= 3, "flipping clip: {flipping:?}");
        assert!(bottom.len() >= 3, "bottom clip: {bottom:?}");

        // The grabbed sheet corner leads the silhouette.
        assert_eq!(flipping[0], calc.position());
    }

    #[test]
    fn a_drag_along_the_corner_row_keeps_a_drawable_silhouette() {
        // Exactly on the corner's own row the fold goes flat; the sheet
        // must still present a drawable polygon, not a collapsed line.
        let mut top = forward_top();
        assert!(top.calc(Point::new(150.0, 0.0)));
        assert!(top.flipping_clip().len() >= 3, "{:?}", top.flipping_clip());

        let mut bottom = FlipCalc::new(FlipDirection::Forward, FlipCorner::Bottom, W, H);
        assert!(bottom.calc(Point::new(150.0, H)));
        assert!(bottom.flipping_clip().len() >= 3);
    }

    #[test]
    fn sheet_follows_the_grabbed_corner() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(80.0, 60.0)));
        let sheet = calc.sheet();
        assert!((sheet.top_left.x - 80.0).abs() < 1e-9);
        assert!((sheet.top_left.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn hard_angle_sweeps_from_flat_to_turned() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(W - 2.0, 2.0)));
        assert!(calc.hard_angle() > 175.0);

        assert!(calc.calc(Point::new(0.0, 1.0)));
        assert!((calc.hard_angle() - 90.0).abs() < 2.0);

        let mut back = FlipCalc::new(FlipDirection::Back, FlipCorner::Top, W, H);
        assert!(back.calc(Point::new(0.0, 1.0)));
        assert!((back.hard_angle() + 90.0).abs() < 2.0);
    }

    #[test]
    fn bottom_corner_mirrors_the_fold() {
        let mut top = forward_top();
        let mut bottom = FlipCalc::new(FlipDirection::Forward, FlipCorner::Bottom, W, H);

        assert!(top.calc(Point::new(50.0, 40.0)));
        assert!(bottom.calc(Point::new(50.0, H - 40.0)));

        assert!((top.progress() - bottom.progress()).abs() < 1e-6);
        assert!((top.angle() + bottom.angle()).abs() < 1e-6);
        assert!(!bottom.flipping_clip().is_empty());
    }

    #[test]
    fn shadow_tracks_the_fold_line() {
        let mut calc = forward_top();
        assert!(calc.calc(Point::new(50.0, 40.0)));

        let origin = calc.shadow_origin().expect("mid-fold shadow");
        assert!((0.0..=W).contains(&origin.x));
        let angle = calc.shadow_angle();
        assert!(angle > 0.0 && angle < PI);
    }

    #[test]
    fn drag_below_the_page_is_pulled_back_to_the_paper_arc() {
        let mut calc = forward_top();
        // Far below the page: unreachable for a sheet hinged at the spine.
        assert!(calc.calc(Point::new(150.0, H * 2.0)));
        let pos = calc.position();
        assert!(pos.to_vec2().hypot() <= W + 1e-6);
    }

    #[test]
    fn active_corner_depends_on_direction() {
        let mut fwd = forward_top();
        assert!(fwd.calc(Point::new(60.0, 20.0)));
        assert_eq!(fwd.active_corner(), fwd.sheet().top_left);

        let mut back = FlipCalc::new(FlipDirection::Back, FlipCorner::Top, W, H);
        assert!(back.calc(Point::new(60.0, 20.0)));
        assert_eq!(back.active_corner(), back.sheet().top_right);
        assert_eq!(back.bottom_page_position(), Point::new(W, 0.0));
    }
}
