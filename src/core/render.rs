//! The seam between the engine and whatever paints it.
//!
//! The core never draws; it pushes page slots, clip geometry and shadow
//! parameters into a [`RenderSink`] and treats each push as the new
//! authoritative visual state. The terminal front-end implements this trait;
//! tests use a recording double.

use kurbo::Point;

use crate::core::calc::{FlipDirection, SheetRect};
use crate::core::page::PageId;

/// Book display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// One page visible at a time.
    Portrait,
    /// Two facing pages.
    Landscape,
}

/// Placement of the book on screen, in global (input) coordinates.
///
/// `width` always spans two page widths; in portrait the left half is a
/// phantom that exists only for the coordinate math, and the single visible
/// page occupies the right half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub page_width: f64,
}

impl BookRect {
    /// Length of a page diagonal; corner hit zones are sized from it.
    pub fn page_diagonal(&self) -> f64 {
        self.page_width.hypot(self.height)
    }
}

/// Fold shadow parameters for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowData {
    /// Anchor of the shadow band, in page-local coordinates.
    pub origin: Point,
    /// Angle of the band against the top edge.
    pub angle: f64,
    /// Turn progress 0–100; drives the shadow's width and opacity.
    pub progress: f64,
    pub direction: FlipDirection,
}

/// Render state receiver. One slot per page role plus shadow and sheet
/// geometry; `None` clears a slot.
pub trait RenderSink {
    fn set_left_page(&mut self, page: Option<PageId>);
    fn set_right_page(&mut self, page: Option<PageId>);
    fn set_flipping_page(&mut self, page: Option<PageId>);
    fn set_bottom_page(&mut self, page: Option<PageId>);

    fn set_shadow(&mut self, shadow: ShadowData);
    fn clear_shadow(&mut self);

    /// The rotated sheet rect of the page currently turning.
    fn set_page_rect(&mut self, sheet: SheetRect);

    /// Direction of the in-progress turn; page-local conversion mirrors x
    /// for backward turns.
    fn set_direction(&mut self, direction: FlipDirection);
    fn direction(&self) -> FlipDirection;

    fn rect(&self) -> BookRect;
    fn orientation(&self) -> Orientation;

    /// Global point → book-relative point (origin at the book's top-left).
    fn convert_to_book(&self, global: Point) -> Point {
        let rect = self.rect();
        Point::new(global.x - rect.left, global.y - rect.top)
    }

    /// Global point → page-local point for the page being turned: origin at
    /// the spine end of its top edge, x toward the grabbed outer edge.
    fn convert_to_page(&self, global: Point) -> Point {
        let rect = self.rect();
        let x = match self.direction() {
            FlipDirection::Forward => global.x - rect.left - rect.width / 2.0,
            FlipDirection::Back => rect.width / 2.0 - global.x + rect.left,
        };
        Point::new(x, global.y - rect.top)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[test]
    fn page_conversion_mirrors_x_for_backward_turns() {
        let mut sink = RecordingSink::new(Orientation::Landscape, 100.0, 150.0);
        sink.rect.left = 10.0;
        sink.rect.top = 5.0;

        // A point 30 units right of the spine, 20 down.
        let global = Point::new(10.0 + 100.0 + 30.0, 25.0);

        sink.set_direction(FlipDirection::Forward);
        let fwd = sink.convert_to_page(global);
        assert_eq!(fwd, Point::new(30.0, 20.0));

        sink.set_direction(FlipDirection::Back);
        let back = sink.convert_to_page(global);
        assert_eq!(back, Point::new(-30.0, 20.0));
    }

    #[test]
    fn book_conversion_is_a_translation() {
        let mut sink = RecordingSink::new(Orientation::Portrait, 80.0, 120.0);
        sink.rect.left = 7.0;
        sink.rect.top = 3.0;
        assert_eq!(
            sink.convert_to_book(Point::new(7.0, 3.0)),
            Point::ZERO
        );
        assert_eq!(
            sink.convert_to_book(Point::new(47.0, 43.0)),
            Point::new(40.0, 40.0)
        );
    }
}
