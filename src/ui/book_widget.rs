//! The book widget — rasterizes the engine's render state into cells.
//!
//! Fold geometry already arrives in cell units (one cell = one unit), so
//! the work here is layering: static pages first, then the page being
//! uncovered clipped to its polygon, the fold shadow, and the turning
//! sheet on top. Soft sheets show their paper back; rigid pages project
//! onto a slab pivoting on the spine.

use kurbo::Point;
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::core::calc::FlipDirection;
use crate::core::collection::PageCollection;
use crate::core::geom::point_in_polygon;
use crate::core::page::{Page, PageDensity, PageId, PageSide};
use crate::core::render::{Orientation, RenderSink};
use crate::ui::content::SampleBook;
use crate::ui::theme::Theme;
use crate::ui::view::BookView;

/// Fraction of the page width the fold shadow spans at full progress.
const SHADOW_SPAN: f64 = 0.75;

pub struct BookWidget<'a> {
    collection: &'a PageCollection,
    view: &'a BookView,
    book: &'a SampleBook,
}

/// Which half of the book rect a column belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Half {
    Left,
    Right,
}

/// Integer cell geometry derived from the engine's book rect.
struct Frame {
    x0: i32,
    y0: i32,
    page_w: i32,
    page_h: i32,
    /// Paintable column range; portrait excludes the phantom left half.
    paint_x0: i32,
    paint_x1: i32,
}

impl Frame {
    fn new(view: &BookView) -> Option<Self> {
        let rect = view.rect();
        let page_w = rect.page_width.round() as i32;
        let page_h = rect.height.round() as i32;
        if page_w < 2 || page_h < 2 {
            return None;
        }

        let x0 = rect.left.round() as i32;
        let y0 = rect.top.round() as i32;
        let (paint_x0, paint_x1) = match view.orientation() {
            Orientation::Landscape => (x0, x0 + page_w * 2),
            Orientation::Portrait => (x0 + page_w, x0 + page_w * 2),
        };
        Some(Self { x0, y0, page_w, page_h, paint_x0, paint_x1 })
    }

    fn spine(&self) -> i32 {
        self.x0 + self.page_w
    }

    fn half_origin(&self, half: Half) -> i32 {
        match half {
            Half::Left => self.x0,
            Half::Right => self.spine(),
        }
    }

    fn half_visible(&self, half: Half) -> bool {
        self.half_origin(half) >= self.paint_x0
    }

    /// Cell center in the mirrored turn space of the active direction.
    fn turn_point(&self, direction: FlipDirection, x: i32, y: i32) -> Point {
        let gx = f64::from(x) + 0.5;
        let px = match direction {
            FlipDirection::Forward => gx - f64::from(self.spine()),
            FlipDirection::Back => f64::from(self.spine()) - gx,
        };
        Point::new(px, f64::from(y) + 0.5 - f64::from(self.y0))
    }

    /// Turn-space x back to a screen column (for polygon bounds).
    fn screen_x(&self, direction: FlipDirection, px: f64) -> f64 {
        match direction {
            FlipDirection::Forward => f64::from(self.spine()) + px,
            FlipDirection::Back => f64::from(self.spine()) - px,
        }
    }
}

/// Bounds-checked cell access, limited to the paintable book region.
fn cell_mut<'b>(
    buf: &'b mut Buffer,
    area: Rect,
    frame: &Frame,
    x: i32,
    y: i32,
) -> Option<&'b mut Cell> {
    if x < frame.paint_x0 || x >= frame.paint_x1 {
        return None;
    }
    if y < frame.y0 || y >= frame.y0 + frame.page_h {
        return None;
    }
    if x < i32::from(area.left())
        || x >= i32::from(area.right())
        || y < i32::from(area.top())
        || y >= i32::from(area.bottom())
    {
        return None;
    }
    buf.cell_mut((x as u16, y as u16))
}

impl<'a> BookWidget<'a> {
    pub fn new(
        collection: &'a PageCollection,
        view: &'a BookView,
        book: &'a SampleBook,
    ) -> Self {
        Self { collection, view, book }
    }

    fn style_for(page: &Page) -> Style {
        match page.drawing_density() {
            PageDensity::Hard => Theme::hard_page_style(),
            PageDensity::Soft => Theme::page_style(),
        }
    }

    /// The page laid out as a character grid: margins, body, page number.
    fn page_grid(&self, page: &Page, frame: &Frame) -> Vec<Vec<char>> {
        let w = frame.page_w as usize;
        let h = frame.page_h as usize;
        let mut grid = vec![vec![' '; w]; h];

        let inner_w = w.saturating_sub(2);
        let inner_h = h.saturating_sub(2);
        if inner_w == 0 || inner_h == 0 {
            return grid;
        }
        if let Some(content) = self.book.page(page.content) {
            for (row, line) in content.layout_lines(inner_w, inner_h).iter().enumerate() {
                for (col, ch) in line.chars().take(inner_w).enumerate() {
                    grid[row + 1][col + 1] = ch;
                }
            }
        }

        // Page number in the outer bottom corner.
        let number = (page.content + 1).to_string();
        if number.len() + 2 <= w {
            let start = match page.side {
                PageSide::Left => 1,
                PageSide::Right => w - 1 - number.len(),
            };
            for (i, ch) in number.chars().enumerate() {
                grid[h - 1][start + i] = ch;
            }
        }
        grid
    }

    /// Draw a page lying flat on one half of the book.
    fn draw_page_half(
        &self,
        buf: &mut Buffer,
        area: Rect,
        frame: &Frame,
        half: Half,
        id: PageId,
    ) {
        if !frame.half_visible(half) {
            return;
        }
        let Some(page) = self.collection.page(id) else {
            return;
        };
        let style = Self::style_for(page);
        let soft = page.drawing_density() == PageDensity::Soft;
        let has_title = self
            .book
            .page(page.content)
            .is_some_and(|c| !c.title.is_empty());
        let grid = self.page_grid(page, frame);
        let hx = frame.half_origin(half);

        for (row, cells) in grid.iter().enumerate() {
            let row_style = if soft && row == 1 && has_title {
                Theme::page_title_style()
            } else if soft && row + 1 == grid.len() {
                Theme::page_number_style()
            } else {
                style
            };
            let y = frame.y0 + row as i32;
            for (col, &ch) in cells.iter().enumerate() {
                if let Some(cell) = cell_mut(buf, area, frame, hx + col as i32, y) {
                    cell.set_char(ch);
                    cell.set_style(row_style);
                }
            }
        }

        // Gutter shading along the spine edge.
        let gutter_x = match half {
            Half::Left => hx + frame.page_w - 1,
            Half::Right => hx,
        };
        for row in 0..frame.page_h {
            if let Some(cell) = cell_mut(buf, area, frame, gutter_x, frame.y0 + row) {
                cell.set_style(Theme::page_edge_style());
            }
        }
    }

    /// The page being uncovered, clipped to the polygon the fold engine
    /// computed for it. An empty polygon means the whole half.
    fn draw_revealed_page(
        &self,
        buf: &mut Buffer,
        area: Rect,
        frame: &Frame,
        direction: FlipDirection,
    ) {
        let Some(id) = self.view.bottom else {
            return;
        };
        let half = match direction {
            FlipDirection::Forward => Half::Right,
            FlipDirection::Back => Half::Left,
        };
        if !frame.half_visible(half) {
            return;
        }
        let Some(page) = self.collection.page(id) else {
            return;
        };
        if page.state.clip.len() < 3 {
            self.draw_page_half(buf, area, frame, half, id);
            return;
        }

        let style = Self::style_for(page);
        let grid = self.page_grid(page, frame);
        let hx = frame.half_origin(half);
        for row in 0..frame.page_h {
            let y = frame.y0 + row;
            for col in 0..frame.page_w {
                let x = hx + col;
                if !point_in_polygon(&page.state.clip, frame.turn_point(direction, x, y)) {
                    continue;
                }
                if let Some(cell) = cell_mut(buf, area, frame, x, y) {
                    cell.set_char(grid[row as usize][col as usize]);
                    cell.set_style(style);
                }
            }
        }
    }

    /// The curling sheet of a soft page: paper-back fill with a marked
    /// outline, rasterized over the clip polygon.
    fn draw_soft_sheet(
        &self,
        buf: &mut Buffer,
        area: Rect,
        frame: &Frame,
        id: PageId,
        direction: FlipDirection,
    ) {
        let Some(page) = self.collection.page(id) else {
            return;
        };
        let clip = &page.state.clip;
        if clip.len() < 3 {
            return;
        }

        let mut x_lo = f64::MAX;
        let mut x_hi = f64::MIN;
        let mut y_lo = f64::MAX;
        let mut y_hi = f64::MIN;
        for p in clip {
            let sx = frame.screen_x(direction, p.x);
            x_lo = x_lo.min(sx);
            x_hi = x_hi.max(sx);
            y_lo = y_lo.min(f64::from(frame.y0) + p.y);
            y_hi = y_hi.max(f64::from(frame.y0) + p.y);
        }

        let x_lo = (x_lo.floor() as i32 - 1).max(frame.paint_x0);
        let x_hi = (x_hi.ceil() as i32 + 1).min(frame.paint_x1 - 1);
        let y_lo = (y_lo.floor() as i32 - 1).max(frame.y0);
        let y_hi = (y_hi.ceil() as i32 + 1).min(frame.y0 + frame.page_h - 1);

        const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                if !point_in_polygon(clip, frame.turn_point(direction, x, y)) {
                    continue;
                }
                let on_edge = NEIGHBORS.iter().any(|&(dx, dy)| {
                    !point_in_polygon(clip, frame.turn_point(direction, x + dx, y + dy))
                });
                if let Some(cell) = cell_mut(buf, area, frame, x, y) {
                    cell.set_char(' ');
                    cell.set_style(if on_edge {
                        Theme::sheet_edge_style()
                    } else {
                        Theme::sheet_back_style()
                    });
                }
            }
        }
    }

    /// A rigid page mid-turn: a slab pivoting on the spine, its width the
    /// horizontal projection of the rotating cover. Past vertical it shows
    /// the front face (the page still sitting in its static slot); once it
    /// tips over, the landing face.
    fn draw_hard_sheet(
        &self,
        buf: &mut Buffer,
        area: Rect,
        frame: &Frame,
        id: PageId,
        direction: FlipDirection,
    ) {
        let Some(page) = self.collection.page(id) else {
            return;
        };
        let angle = page.state.hard_angle.abs().clamp(0.0, 180.0);
        let proj = (f64::from(frame.page_w) * angle.to_radians().cos().abs()).round() as i32;
        if proj < 1 {
            return; // edge-on
        }

        let on_source_side = angle > 90.0;
        let half = match (direction, on_source_side) {
            (FlipDirection::Forward, true) | (FlipDirection::Back, false) => Half::Right,
            _ => Half::Left,
        };
        if !frame.half_visible(half) {
            return;
        }

        let face = if on_source_side {
            match direction {
                FlipDirection::Forward => self.view.right,
                FlipDirection::Back => self.view.left,
            }
        } else {
            Some(id)
        };
        let face_page = face.and_then(|f| self.collection.page(f));
        let grid = face_page.map(|p| self.page_grid(p, frame));
        let style = face_page.map_or_else(Theme::hard_page_style, Self::style_for);

        let spine = frame.spine();
        let last_src = (frame.page_w - 1) as usize;
        for i in 0..proj {
            let x = match half {
                Half::Right => spine + i,
                Half::Left => spine - 1 - i,
            };
            // Squeeze the face horizontally into the slab, counting
            // columns outward from the spine on both sides.
            let from_spine =
                ((f64::from(i) / f64::from(proj)) * f64::from(frame.page_w)) as usize;
            let src = match half {
                Half::Right => from_spine.min(last_src),
                Half::Left => last_src - from_spine.min(last_src),
            };
            let col_style = if i + 1 == proj {
                Theme::sheet_edge_style()
            } else {
                style
            };
            for row in 0..frame.page_h {
                let ch = grid
                    .as_ref()
                    .map_or(' ', |g| g[row as usize][src]);
                if let Some(cell) = cell_mut(buf, area, frame, x, frame.y0 + row) {
                    cell.set_char(ch);
                    cell.set_style(col_style);
                }
            }
        }
    }

    /// Darken a band along the fold line. Applied as a style patch so the
    /// text underneath stays legible.
    fn draw_shadow(&self, buf: &mut Buffer, area: Rect, frame: &Frame) {
        let Some(shadow) = self.view.shadow else {
            return;
        };
        let span = f64::from(frame.page_w) * SHADOW_SPAN * (shadow.progress / 100.0);
        if span < 0.5 {
            return;
        }
        let (sin, cos) = shadow.angle.sin_cos();

        for y in frame.y0..frame.y0 + frame.page_h {
            for x in frame.paint_x0..frame.paint_x1 {
                let v = frame.turn_point(shadow.direction, x, y) - shadow.origin;
                let dist = (v.x * sin - v.y * cos).abs();
                if dist >= span {
                    continue;
                }
                let style = if dist < span / 3.0 {
                    Theme::shadow_style()
                } else {
                    Theme::shadow_soft_style()
                };
                if let Some(cell) = cell_mut(buf, area, frame, x, y) {
                    cell.set_style(style);
                }
            }
        }
    }
}

impl Widget for BookWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = Frame::new(self.view) else {
            return;
        };

        if let Some(id) = self.view.left {
            self.draw_page_half(buf, area, &frame, Half::Left, id);
        }
        if let Some(id) = self.view.right {
            self.draw_page_half(buf, area, &frame, Half::Right, id);
        }

        let Some(flip_id) = self.view.flipping else {
            return;
        };
        let direction = self.view.direction();
        let hard = self
            .collection
            .page(flip_id)
            .is_some_and(|p| p.drawing_density() == PageDensity::Hard);

        if hard {
            if let Some(bottom) = self.view.bottom {
                let half = match direction {
                    FlipDirection::Forward => Half::Right,
                    FlipDirection::Back => Half::Left,
                };
                self.draw_page_half(buf, area, &frame, half, bottom);
            }
            self.draw_hard_sheet(buf, area, &frame, flip_id, direction);
        } else {
            self.draw_revealed_page(buf, area, &frame, direction);
            self.draw_shadow(buf, area, &frame);
            self.draw_soft_sheet(buf, area, &frame, flip_id, direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::{Settings, SizeMode};
    use ratatui::style::Color;

    fn fixture() -> (PageCollection, BookView, SampleBook) {
        let book = SampleBook::generate(10);
        let collection =
            PageCollection::load(&book, &Settings::default()).expect("non-empty book");
        let mut view = BookView::new(SizeMode::Stretch, None);
        view.layout(Rect::new(0, 0, 84, 26));
        (collection, view, book)
    }

    fn render(collection: &PageCollection, view: &BookView, book: &SampleBook) -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, 84, 26));
        let area = buf.area;
        BookWidget::new(collection, view, book).render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
            .collect()
    }

    fn bg(buf: &Buffer, x: u16, y: u16) -> Option<Color> {
        buf.cell((x, y)).and_then(|c| c.style().bg)
    }

    // Layout fixture geometry: book at columns 1..83, rows 1..25, page
    // width 41, spine at column 42.

    #[test]
    fn the_opening_spread_shows_the_cover_alone_on_the_right() {
        let (mut collection, mut view, book) = fixture();
        collection.show_spread(view.orientation(), &mut view);
        let buf = render(&collection, &view, &book);

        assert!(row_text(&buf, 2).contains("THE FOLDED LEAF"));
        // Cover pages are card stock.
        assert_eq!(bg(&buf, 60, 2), Some(Color::LightYellow));
        // The left half stays empty until the cover is opened.
        assert_eq!(bg(&buf, 20, 2), Some(Color::Reset));
    }

    #[test]
    fn a_pair_spread_fills_both_halves_with_numbered_pages() {
        let (mut collection, mut view, book) = fixture();
        assert!(collection.show_page(view.orientation(), 3));
        collection.show_spread(view.orientation(), &mut view);
        let buf = render(&collection, &view, &book);

        assert_eq!(bg(&buf, 20, 12), Some(Color::White));
        assert_eq!(bg(&buf, 60, 12), Some(Color::White));
        // Page numbers sit in the outer bottom corners.
        assert_eq!(buf.cell((2, 24)).unwrap().symbol(), "4");
        assert_eq!(buf.cell((81, 24)).unwrap().symbol(), "5");
    }

    #[test]
    fn a_soft_turn_layers_the_sheet_over_the_revealed_page() {
        let (mut collection, mut view, book) = fixture();
        assert!(collection.show_page(view.orientation(), 3));
        collection.show_spread(view.orientation(), &mut view);

        // Hand-crafted mid-turn frame: pages 5/6 of the next spread, with
        // a square sheet silhouette near the outer edge.
        view.set_direction(FlipDirection::Forward);
        view.set_flipping_page(Some(5));
        view.set_bottom_page(Some(6));
        collection.page_mut(5).unwrap().state.clip = vec![
            Point::new(28.0, 8.0),
            Point::new(38.0, 8.0),
            Point::new(38.0, 18.0),
            Point::new(28.0, 18.0),
        ];
        let buf = render(&collection, &view, &book);

        // Inside the silhouette: the sheet's paper back.
        assert_eq!(bg(&buf, 75, 14), Some(Color::Gray));
        // Its outline is marked darker.
        assert_eq!(bg(&buf, 70, 9), Some(Color::DarkGray));
        // The empty bottom clip means page 6 already covers the half, so
        // its number replaces page 5's in the corner.
        assert_eq!(buf.cell((81, 24)).unwrap().symbol(), "7");
    }

    #[test]
    fn a_hard_turn_draws_a_slab_pivoting_on_the_spine() {
        let (mut collection, mut view, book) = fixture();
        assert!(collection.show_page(view.orientation(), 1));
        collection.show_spread(view.orientation(), &mut view);

        // Backward turn toward the front cover, caught past vertical.
        view.set_direction(FlipDirection::Back);
        view.set_flipping_page(Some(0));
        view.set_bottom_page(Some(0));
        collection.page_mut(0).unwrap().state.hard_angle = -120.0;
        let buf = render(&collection, &view, &book);

        // Projection of a 41-wide page at 120 degrees is 21 columns, so
        // the slab spans columns 21..42 with its moving edge at 21. Past
        // vertical it shows the front face, page 1, over the cover the
        // lifted leaf is uncovering.
        assert_eq!(bg(&buf, 20, 12), Some(Color::LightYellow));
        assert_eq!(bg(&buf, 21, 12), Some(Color::DarkGray));
        assert_eq!(bg(&buf, 30, 12), Some(Color::White));
    }

    #[test]
    fn portrait_leaves_the_phantom_half_untouched() {
        let book = SampleBook::generate(10);
        let mut collection =
            PageCollection::load(&book, &Settings::default()).expect("non-empty book");
        let mut view = BookView::new(SizeMode::Stretch, Some(Orientation::Portrait));
        view.layout(Rect::new(0, 0, 40, 20));
        collection.show_spread(view.orientation(), &mut view);

        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 20));
        let area = buf.area;
        BookWidget::new(&collection, &view, &book).render(area, &mut buf);

        assert_eq!(bg(&buf, 0, 5), Some(Color::Reset));
        assert_eq!(bg(&buf, 20, 5), Some(Color::LightYellow));
    }

    #[test]
    fn degenerate_areas_draw_nothing() {
        let (collection, _, book) = fixture();
        let mut view = BookView::new(SizeMode::Stretch, None);
        view.layout(Rect::new(0, 0, 3, 2));

        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 2));
        let area = buf.area;
        BookWidget::new(&collection, &view, &book).render(area, &mut buf);
        assert_eq!(bg(&buf, 1, 1), Some(Color::Reset));
    }
}
