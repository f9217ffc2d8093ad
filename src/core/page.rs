//! Logical pages and their transient render state.
//!
//! Pages live in an arena owned by [`PageCollection`](super::collection::PageCollection)
//! and are addressed by index, so the flip machine can hold onto its two
//! participants without borrowing the collection across frames.

use kurbo::Point;

/// Index of a page inside the collection's arena.
pub type PageId = usize;

/// How a page behaves while turning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDensity {
    /// Bends, producing the curling silhouette.
    Soft,
    /// Rotates rigidly (covers, card stock).
    Hard,
}

/// Which half of the open book a page currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    Left,
    Right,
}

/// Per-frame geometry the flip machine writes and the renderer reads.
///
/// This is transient output, not content: it is overwritten wholesale on
/// every gesture frame and cleared when a turn resolves.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Draw origin of the page in page-local coordinates.
    pub position: Point,
    /// Soft-bend rotation in radians (0 for hard pages).
    pub angle: f64,
    /// Rigid cover rotation in degrees, 0–180 (unused for soft pages).
    pub hard_angle: f64,
    /// Visible region polygon. The renderer reads it per slot: on the
    /// page being uncovered, fewer than three points means "draw the
    /// whole page"; on the turning sheet it means "draw nothing".
    pub clip: Vec<Point>,
}

/// One content unit of the book.
#[derive(Debug, Clone)]
pub struct Page {
    /// Nominal density, fixed at load time (covers are hard).
    density: PageDensity,
    /// Display-only override used to harmonize a turning page with its
    /// neighbor mid-turn; reverts to `density` when the session ends.
    drawing_density: PageDensity,
    /// Side of the spread the page is shown on.
    pub side: PageSide,
    /// Transient render geometry.
    pub state: PageState,
    /// Index into the front-end's content list. Ephemeral copies share the
    /// index of their source page.
    pub content: usize,
    /// True for a session-owned copy (portrait forward flip preview).
    pub temporary: bool,
}

impl Page {
    pub fn new(content: usize, density: PageDensity) -> Self {
        Self {
            density,
            drawing_density: density,
            side: PageSide::Right,
            state: PageState::default(),
            content,
            temporary: false,
        }
    }

    pub fn density(&self) -> PageDensity {
        self.density
    }

    /// Reassign the nominal density (covers get marked hard when the spread
    /// partition is built). Also resets the display override.
    pub fn set_density(&mut self, density: PageDensity) {
        self.density = density;
        self.drawing_density = density;
    }

    pub fn drawing_density(&self) -> PageDensity {
        self.drawing_density
    }

    pub fn set_drawing_density(&mut self, density: PageDensity) {
        self.drawing_density = density;
    }

    pub fn reset_drawing_density(&mut self) {
        self.drawing_density = self.density;
    }

    /// Ephemeral clone used as the turning page in portrait forward flips.
    /// Shares content with the source; its geometry starts clean.
    pub fn temporary_copy(&self) -> Self {
        Self {
            density: self.density,
            drawing_density: self.drawing_density,
            side: self.side,
            state: PageState::default(),
            content: self.content,
            temporary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_density_resets_the_drawing_override() {
        let mut page = Page::new(0, PageDensity::Soft);
        page.set_drawing_density(PageDensity::Hard);
        assert_eq!(page.drawing_density(), PageDensity::Hard);

        page.set_density(PageDensity::Hard);
        assert_eq!(page.density(), PageDensity::Hard);
        assert_eq!(page.drawing_density(), PageDensity::Hard);

        page.set_drawing_density(PageDensity::Soft);
        page.reset_drawing_density();
        assert_eq!(page.drawing_density(), PageDensity::Hard);
    }

    #[test]
    fn temporary_copy_shares_content_but_not_geometry() {
        let mut page = Page::new(7, PageDensity::Soft);
        page.state.angle = 1.5;
        page.state.clip.push(Point::new(1.0, 2.0));

        let copy = page.temporary_copy();
        assert!(copy.temporary);
        assert_eq!(copy.content, 7);
        assert_eq!(copy.state.angle, 0.0);
        assert!(copy.state.clip.is_empty());
    }
}
