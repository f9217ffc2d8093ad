//! Page ownership, spread partitions, and loop-zone virtualization.
//!
//! The collection owns every [`Page`] in an arena and derives two parallel
//! spread partitions from it: landscape (facing pairs, with solo covers)
//! and portrait (singletons). "Which spread is current" is never stored per
//! partition; it is reduced on demand from a single source of truth — the
//! raw current page, or the virtual cursor when virtualization is on — so
//! the two partitions can never drift apart across orientation switches.
//!
//! Virtualization lets a book pretend to have far more turnable positions
//! than it has materialized pages: positions in the middle "loop zone" all
//! alias onto one reused central spread, while the extremities map onto the
//! real spreads bijectively.

use thiserror::Error;

use crate::core::calc::FlipDirection;
use crate::core::page::{Page, PageDensity, PageId, PageSide};
use crate::core::render::{Orientation, RenderSink};
use crate::core::settings::Settings;

/// Supplies the materialized pages of a book.
pub trait PageProvider {
    fn page_count(&self) -> usize;
    /// Nominal density of one page. The partition build may still force
    /// covers to hard.
    fn density(&self, page: usize) -> PageDensity;
}

/// Errors from page-collection operations that take caller-supplied
/// indices. Routine boundary checks use `Option`/`bool` instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("book has no pages")]
    EmptyBook,
    #[error("spread index {index} out of range ({len} spreads)")]
    SpreadOutOfRange { index: usize, len: usize },
}

/// One or two pages shown together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    Single(PageId),
    Pair(PageId, PageId),
}

impl Spread {
    /// Leftmost (lowest-numbered) member.
    pub fn first(&self) -> PageId {
        match *self {
            Spread::Single(page) => page,
            Spread::Pair(left, _) => left,
        }
    }

    pub fn contains(&self, page: PageId) -> bool {
        match *self {
            Spread::Single(p) => p == page,
            Spread::Pair(left, right) => left == page || right == page,
        }
    }
}

/// The aliasing window for virtualized books.
///
/// Positions below `start` map onto the leading real spreads one to one;
/// positions at or past `end` map onto the trailing ones by a mirrored
/// offset; everything between collapses onto `center`. Recomputed from the
/// partition at each use, so it can never disagree with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopZone {
    pub start: usize,
    pub end: usize,
    pub center: usize,
}

impl LoopZone {
    /// The zone for `real_spreads` materialized spreads pretending to be
    /// `virtual_positions` turnable positions. `None` when virtualization
    /// has nothing to do (`virtual_positions <= real_spreads`).
    pub fn for_counts(real_spreads: usize, virtual_positions: usize) -> Option<Self> {
        if real_spreads == 0 || virtual_positions <= real_spreads {
            return None;
        }
        let start = real_spreads / 2;
        Some(Self {
            start,
            end: virtual_positions - start,
            center: real_spreads / 2,
        })
    }

    /// Map a virtual position onto a real spread index.
    pub fn resolve(
        &self,
        real_spreads: usize,
        virtual_positions: usize,
        position: usize,
    ) -> usize {
        if self.contains(position) {
            self.center
        } else if position < self.start {
            position
        } else {
            real_spreads - (virtual_positions - position)
        }
    }

    /// True when `position` falls in the collapsed middle of the window.
    pub fn contains(&self, position: usize) -> bool {
        (self.start..self.end).contains(&position)
    }
}

/// The two pages participating in a turn, by arena id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPages {
    /// The page riding the folding sheet.
    pub flipping: PageId,
    /// The stationary page revealed underneath.
    pub bottom: PageId,
}

/// Arena of pages plus the derived spread partitions and the navigation
/// cursor.
pub struct PageCollection {
    pages: Vec<Page>,
    /// Pages that belong to the book; anything past this is a session-owned
    /// ephemeral copy.
    logical_count: usize,
    show_cover: bool,
    /// Virtual turnable positions; 0 disables virtualization.
    total_virtual: usize,

    landscape: Vec<Spread>,
    portrait: Vec<Spread>,

    /// Raw current page — source of truth when not virtualized.
    current_page: usize,
    /// Virtual position cursor — source of truth when virtualized.
    cursor: usize,
    /// At most one live ephemeral copy (portrait forward flip).
    temporary: Option<PageId>,
}

impl PageCollection {
    /// Materialize the book and build both partitions.
    pub fn load(provider: &dyn PageProvider, settings: &Settings) -> Result<Self, BookError> {
        let count = provider.page_count();
        if count == 0 {
            return Err(BookError::EmptyBook);
        }

        let pages = (0..count)
            .map(|i| Page::new(i, provider.density(i)))
            .collect();

        let mut collection = Self {
            pages,
            logical_count: count,
            show_cover: settings.show_cover,
            total_virtual: settings.total_virtual_pages,
            landscape: Vec::new(),
            portrait: Vec::new(),
            current_page: 0,
            cursor: 0,
            temporary: None,
        };
        collection.create_spread();

        if collection.total_virtual > 0 && collection.total_virtual <= collection.landscape.len()
        {
            tracing::debug!(
                virtual = collection.total_virtual,
                real = collection.landscape.len(),
                "virtual position count does not exceed the real spread count; \
                 virtualization stays inactive"
            );
        }

        Ok(collection)
    }

    /// Rebuild both partitions from scratch. Marks the first page hard when
    /// covers are shown, and a trailing solo landscape page hard.
    pub fn create_spread(&mut self) {
        let n = self.logical_count;

        self.portrait = (0..n).map(Spread::Single).collect();

        self.landscape.clear();
        let mut next = 0;
        if self.show_cover {
            self.pages[0].set_density(PageDensity::Hard);
            self.landscape.push(Spread::Single(0));
            next = 1;
        }
        while next < n {
            if next < n - 1 {
                self.landscape.push(Spread::Pair(next, next + 1));
            } else {
                self.pages[next].set_density(PageDensity::Hard);
                self.landscape.push(Spread::Single(next));
            }
            next += 2;
        }
    }

    // ── lookups ────────────────────────────────────────────────

    #[inline]
    pub fn page_count(&self) -> usize {
        self.logical_count
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    /// Next logical page after `id`, ignoring ephemeral copies.
    pub fn next_of(&self, id: PageId) -> Option<PageId> {
        (id + 1 < self.logical_count).then_some(id + 1)
    }

    pub fn prev_of(&self, id: PageId) -> Option<PageId> {
        id.checked_sub(1)
    }

    pub fn spreads(&self, orientation: Orientation) -> &[Spread] {
        match orientation {
            Orientation::Landscape => &self.landscape,
            Orientation::Portrait => &self.portrait,
        }
    }

    /// The loop zone for an orientation, when virtualization is active for
    /// its spread count.
    pub fn loop_zone(&self, orientation: Orientation) -> Option<LoopZone> {
        LoopZone::for_counts(self.spreads(orientation).len(), self.total_virtual)
    }

    #[inline]
    fn virtual_mode(&self) -> bool {
        self.total_virtual > 0
    }

    /// Virtual position → real spread index for one orientation. Falls back
    /// to a clamped identity when the virtual count is not actually larger
    /// than the partition.
    fn resolve_position(&self, orientation: Orientation, position: usize) -> usize {
        let real = self.spreads(orientation).len();
        match self.loop_zone(orientation) {
            Some(zone) => zone.resolve(real, self.total_virtual, position),
            None => position.min(real.saturating_sub(1)),
        }
    }

    /// The current spread index for an orientation, reduced on demand from
    /// the cursor (virtual) or the current page (otherwise).
    pub fn current_spread_index(&self, orientation: Orientation) -> usize {
        if self.virtual_mode() {
            self.resolve_position(orientation, self.cursor)
        } else {
            self.scan_for_page(orientation, self.current_page).unwrap_or(0)
        }
    }

    /// The spread containing `page`. In virtual mode `page` is a virtual
    /// position and resolves through the loop zone.
    pub fn spread_index_of_page(&self, orientation: Orientation, page: usize) -> Option<usize> {
        if self.virtual_mode() {
            (page < self.total_virtual).then(|| self.resolve_position(orientation, page))
        } else {
            self.scan_for_page(orientation, page)
        }
    }

    fn scan_for_page(&self, orientation: Orientation, page: usize) -> Option<usize> {
        self.spreads(orientation)
            .iter()
            .position(|spread| spread.contains(page))
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Turnable positions for an orientation (virtual count when active).
    pub fn position_count(&self, orientation: Orientation) -> usize {
        if self.virtual_mode() {
            self.total_virtual
        } else {
            self.spreads(orientation).len()
        }
    }

    /// Current turnable position for an orientation.
    pub fn current_position(&self, orientation: Orientation) -> usize {
        if self.virtual_mode() {
            self.cursor
        } else {
            self.current_spread_index(orientation)
        }
    }

    /// Highest valid jump target: the final virtual position, or the final
    /// page.
    pub fn last_page(&self) -> usize {
        if self.virtual_mode() {
            self.total_virtual - 1
        } else {
            self.logical_count - 1
        }
    }

    /// Whether a turn in `direction` is possible from the current position.
    pub fn can_turn(&self, direction: FlipDirection) -> bool {
        if self.virtual_mode() {
            match direction {
                FlipDirection::Forward => self.cursor + 1 < self.total_virtual,
                FlipDirection::Back => self.cursor >= 1,
            }
        } else {
            match direction {
                FlipDirection::Forward => self.current_page + 1 < self.logical_count,
                FlipDirection::Back => self.current_page >= 1,
            }
        }
    }

    // ── navigation ─────────────────────────────────────────────

    /// Advance one position. Returns whether the cursor moved.
    pub fn show_next(&mut self, orientation: Orientation) -> bool {
        if self.virtual_mode() {
            if self.cursor + 1 >= self.total_virtual {
                return false;
            }
            self.cursor += 1;
            self.sync_page_to_cursor(orientation);
            true
        } else {
            let index = self.current_spread_index(orientation);
            match self.spreads(orientation).get(index + 1) {
                Some(spread) => {
                    self.current_page = spread.first();
                    true
                }
                None => false,
            }
        }
    }

    /// Retreat one position. Returns whether the cursor moved.
    pub fn show_prev(&mut self, orientation: Orientation) -> bool {
        if self.virtual_mode() {
            match self.cursor.checked_sub(1) {
                Some(prev) => {
                    self.cursor = prev;
                    self.sync_page_to_cursor(orientation);
                    true
                }
                None => false,
            }
        } else {
            let index = self.current_spread_index(orientation);
            match index.checked_sub(1).and_then(|i| self.spreads(orientation).get(i)) {
                Some(spread) => {
                    self.current_page = spread.first();
                    true
                }
                None => false,
            }
        }
    }

    /// Jump to the spread containing `page` (a virtual position in virtual
    /// mode). Returns whether the jump landed.
    pub fn show_page(&mut self, orientation: Orientation, page: usize) -> bool {
        if self.virtual_mode() {
            if page >= self.total_virtual {
                return false;
            }
            self.cursor = page;
            self.sync_page_to_cursor(orientation);
            true
        } else {
            match self.scan_for_page(orientation, page) {
                Some(index) => {
                    self.current_page = self.spreads(orientation)[index].first();
                    true
                }
                None => false,
            }
        }
    }

    /// Direct jump to a real spread index.
    pub fn set_current_spread_index(
        &mut self,
        orientation: Orientation,
        index: usize,
    ) -> Result<(), BookError> {
        let len = self.spreads(orientation).len();
        if index >= len {
            return Err(BookError::SpreadOutOfRange { index, len });
        }

        if self.virtual_mode() {
            // Pick the bijective representative of the spread: leading
            // positions map by identity, trailing ones by mirrored offset.
            self.cursor = match self.loop_zone(orientation) {
                Some(zone) if index >= zone.start => {
                    self.total_virtual - (len - index)
                }
                _ => index,
            };
        }
        self.current_page = self.spreads(orientation)[index].first();
        Ok(())
    }

    fn sync_page_to_cursor(&mut self, orientation: Orientation) {
        let index = self.resolve_position(orientation, self.cursor);
        if let Some(spread) = self.spreads(orientation).get(index) {
            self.current_page = spread.first();
        }
    }

    // ── turn participants ──────────────────────────────────────

    /// Real spread index adjacent to the current position in `direction`.
    fn adjacent_spread(
        &self,
        orientation: Orientation,
        direction: FlipDirection,
    ) -> Option<usize> {
        if self.virtual_mode() {
            let next = match direction {
                FlipDirection::Forward => self.cursor + 1,
                FlipDirection::Back => self.cursor.checked_sub(1)?,
            };
            (next < self.total_virtual).then(|| self.resolve_position(orientation, next))
        } else {
            let index = self.current_spread_index(orientation);
            let next = match direction {
                FlipDirection::Forward => index + 1,
                FlipDirection::Back => index.checked_sub(1)?,
            };
            (next < self.spreads(orientation).len()).then_some(next)
        }
    }

    /// Resolve the two pages participating in a turn from the current
    /// position, assigning the sides they will land on. `None` at a
    /// boundary. Portrait forward turns peel an ephemeral copy of the
    /// current page; the copy lives until [`release_temporary`] runs.
    ///
    /// [`release_temporary`]: PageCollection::release_temporary
    pub fn turn_participants(
        &mut self,
        orientation: Orientation,
        direction: FlipDirection,
    ) -> Option<TurnPages> {
        let adjacent = self.adjacent_spread(orientation, direction)?;

        let pair = match orientation {
            Orientation::Landscape => {
                let spread = *self.spreads(orientation).get(adjacent)?;
                match (spread, direction) {
                    (Spread::Pair(left, right), FlipDirection::Forward) => {
                        TurnPages { flipping: left, bottom: right }
                    }
                    (Spread::Pair(left, right), FlipDirection::Back) => {
                        TurnPages { flipping: right, bottom: left }
                    }
                    (Spread::Single(page), _) => TurnPages { flipping: page, bottom: page },
                }
            }
            Orientation::Portrait => {
                let target = self.spreads(orientation).get(adjacent)?.first();
                match direction {
                    FlipDirection::Forward => {
                        let current = self.current_spread_index(orientation);
                        let source = self.spreads(orientation).get(current)?.first();
                        let copy = self.acquire_temporary(source)?;
                        TurnPages { flipping: copy, bottom: target }
                    }
                    // A single-page view folds back onto itself: the page
                    // coming in is also what shows under the curl.
                    FlipDirection::Back => TurnPages { flipping: target, bottom: target },
                }
            }
        };

        let (flip_side, bottom_side) = match (orientation, direction) {
            (Orientation::Portrait, _) => (PageSide::Right, PageSide::Right),
            (_, FlipDirection::Forward) => (PageSide::Left, PageSide::Right),
            (_, FlipDirection::Back) => (PageSide::Right, PageSide::Left),
        };
        self.set_side(pair.flipping, flip_side);
        self.set_side(pair.bottom, bottom_side);

        Some(pair)
    }

    fn acquire_temporary(&mut self, source: PageId) -> Option<PageId> {
        self.release_temporary();
        let copy = self.pages.get(source)?.temporary_copy();
        self.pages.push(copy);
        let id = self.pages.len() - 1;
        self.temporary = Some(id);
        Some(id)
    }

    /// Drop the session's ephemeral copy, if one exists.
    pub fn release_temporary(&mut self) {
        if self.temporary.take().is_some() {
            self.pages.truncate(self.logical_count);
        }
    }

    fn set_side(&mut self, id: PageId, side: PageSide) {
        if let Some(page) = self.pages.get_mut(id) {
            page.side = side;
        }
    }

    // ── render pushes ──────────────────────────────────────────

    /// Push the current spread into the sink's static page slots. A solo
    /// last landscape page sits on the left; any other solo page on the
    /// right.
    pub fn show_spread(&mut self, orientation: Orientation, sink: &mut dyn RenderSink) {
        let index = self.current_spread_index(orientation);
        let Some(spread) = self.spreads(orientation).get(index).copied() else {
            return;
        };

        match spread {
            Spread::Pair(left, right) => {
                self.set_side(left, PageSide::Left);
                self.set_side(right, PageSide::Right);
                sink.set_left_page(Some(left));
                sink.set_right_page(Some(right));
            }
            Spread::Single(page) => {
                let closes_the_book = orientation == Orientation::Landscape
                    && page == self.logical_count - 1
                    && self.logical_count > 1;
                if closes_the_book {
                    self.set_side(page, PageSide::Left);
                    sink.set_left_page(Some(page));
                    sink.set_right_page(None);
                } else {
                    self.set_side(page, PageSide::Right);
                    sink.set_left_page(None);
                    sink.set_right_page(Some(page));
                }
            }
        }
    }
}
