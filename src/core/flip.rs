//! The turn state machine.
//!
//! Owns the lifecycle of one corner-fold session at a time: engage on a
//! grab, click, or corner hover, feed pointer positions through the fold
//! math, and either commit the turn or spring back when the fold is
//! released. Animated phases run off the shared frame tick; a new session
//! started mid-animation force-completes the old run first, so at most one
//! activity is ever in flight.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use kurbo::Point;

use crate::core::animation::{AnimationTick, Animator};
use crate::core::calc::{FlipCalc, FlipCorner, FlipDirection};
use crate::core::collection::{PageCollection, TurnPages};
use crate::core::geom::line_points;
use crate::core::page::{PageDensity, PageState};
use crate::core::render::{Orientation, RenderSink, ShadowData};
use crate::core::settings::Settings;

/// Width against which step counts are normalized when scaling the turn
/// duration, so narrow books do not snap shut instantly.
const REFERENCE_PAGE_WIDTH: f64 = 300.0;

/// Where the engine is in the turn lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipPhase {
    /// At rest; both static pages visible.
    #[default]
    Read,
    /// The user holds the fold and drives it directly.
    UserFold,
    /// A corner peek is showing (hover, no grab).
    FoldCorner,
    /// An animation drives the fold to its destination.
    Flipping,
}

/// What to do when the current animation run reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinishAction {
    /// Advance the cursor and dismantle the session.
    Commit,
    /// Dismantle the session without moving the cursor.
    Release,
    /// Keep the session alive; the corner stays peeked for hovering.
    HoldCorner,
}

struct Session {
    /// Fold calculator; also the single owner of the session's direction
    /// and grabbed corner.
    calc: FlipCalc,
    pages: TurnPages,
    /// Pages whose drawing density was forced hard for this session.
    hardened: Vec<usize>,
}

/// Turn-session controller. Holds no page data itself; pages live in the
/// collection and visual slots live in the sink, both passed per call.
pub struct Flip {
    settings: Settings,
    phase: FlipPhase,
    session: Option<Session>,
    animator: Animator,
    pending: Option<FinishAction>,
}

impl Flip {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            phase: FlipPhase::default(),
            session: None,
            animator: Animator::new(),
            pending: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> FlipPhase {
        self.phase
    }

    /// Whether a fold session is engaged (grabbed, peeked, or animating).
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    // ── pointer entry points ───────────────────────────────────

    /// Grab the fold and drag it to `global`. Starts a session if none is
    /// engaged; a grab mid-animation takes the fold over where it is.
    pub fn fold(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        global: Point,
    ) {
        if self.animator.is_active() {
            self.animator.cancel();
            self.pending = None;
        }
        if self.session.is_none() && !self.start(collection, sink, global) {
            return;
        }
        self.set_phase(FlipPhase::UserFold);
        let pos = sink.convert_to_page(global);
        self.apply_fold(collection, sink, pos);
    }

    /// Turn the page nearest to `global` with a full animation.
    pub fn flip_at(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        global: Point,
        now: Instant,
    ) {
        if self.settings.disable_flip_by_click && !self.point_on_corners(sink, global) {
            return;
        }
        if self.session.is_some() {
            self.finish_animation(collection, sink);
        }
        if !self.start(collection, sink, global) {
            return;
        }

        let rect = sink.rect();
        let margin = rect.height / 10.0;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (y_start, y_dest) = match session.calc.corner() {
            FlipCorner::Top => (margin, 0.0),
            FlipCorner::Bottom => (rect.height - margin, rect.height),
        };
        let from = Point::new(rect.page_width - margin, y_start);
        session.calc.calc(from);

        self.set_phase(FlipPhase::Flipping);
        self.animate_to(
            sink,
            from,
            Point::new(-rect.page_width, y_dest),
            FinishAction::Commit,
            now,
        );
    }

    /// Turn forward from the outer right edge.
    pub fn flip_next(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        corner: FlipCorner,
        now: Instant,
    ) {
        let rect = sink.rect();
        let y = match corner {
            FlipCorner::Top => rect.top + 1.0,
            FlipCorner::Bottom => rect.top + rect.height - 2.0,
        };
        self.flip_at(
            collection,
            sink,
            Point::new(rect.left + rect.page_width * 2.0 - 1.0, y),
            now,
        );
    }

    /// Turn back from the outer left edge.
    pub fn flip_prev(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        corner: FlipCorner,
        now: Instant,
    ) {
        let rect = sink.rect();
        let y = match corner {
            FlipCorner::Top => rect.top + 1.0,
            FlipCorner::Bottom => rect.top + rect.height - 2.0,
        };
        self.flip_at(collection, sink, Point::new(rect.left + 1.0, y), now);
    }

    /// Move the book to the spread holding `page`, entering with a single
    /// animated turn from the adjacent spread. Out-of-range targets are
    /// ignored.
    pub fn flip_to_page(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        page: usize,
        corner: FlipCorner,
        now: Instant,
    ) {
        let orientation = sink.orientation();
        let current = collection.current_spread_index(orientation);
        let Some(target) = collection.spread_index_of_page(orientation, page) else {
            return;
        };

        match target.cmp(&current) {
            Ordering::Greater => {
                if collection.set_current_spread_index(orientation, target - 1).is_ok() {
                    self.flip_next(collection, sink, corner, now);
                }
            }
            Ordering::Less => {
                if collection.set_current_spread_index(orientation, target + 1).is_ok() {
                    self.flip_prev(collection, sink, corner, now);
                }
            }
            Ordering::Equal => {}
        }
    }

    /// React to a hover at `global`: peek the corner when the pointer sits
    /// in a corner zone, follow it while peeked, spring back on leave.
    /// Rigid covers lift on their own clock; with the lift disabled they
    /// peek through the soft path like any other page.
    pub fn show_corner(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        global: Point,
        now: Instant,
    ) {
        if !matches!(self.phase, FlipPhase::Read | FlipPhase::FoldCorner) {
            return;
        }

        if !self.point_on_corners(sink, global) {
            self.lower_corner(collection, sink, now);
            return;
        }

        if let Some(session) = self.session.as_ref() {
            // A running lift owns rigid pages; the pointer must not write
            // competing fold geometry under it.
            let rigid = collection
                .page(session.pages.flipping)
                .map(|p| p.drawing_density())
                == Some(PageDensity::Hard);
            if rigid && self.settings.cover_lift.is_some() && self.animator.is_active() {
                return;
            }
            let pos = sink.convert_to_page(global);
            self.apply_fold(collection, sink, pos);
            return;
        }

        if !self.start(collection, sink, global) {
            return;
        }
        self.set_phase(FlipPhase::FoldCorner);

        let rect = sink.rect();
        let peek = (rect.page_diagonal() / 10.0).max(1.0);
        let (from, to, rigid) = {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let (y_start, y_dest) = match session.calc.corner() {
                FlipCorner::Top => (1.0, peek),
                FlipCorner::Bottom => (rect.height - 1.0, rect.height - peek),
            };
            let from = Point::new(rect.page_width - 1.0, y_start);
            session.calc.calc(from);
            let rigid = collection
                .page(session.pages.flipping)
                .map(|p| p.drawing_density())
                == Some(PageDensity::Hard);
            (from, Point::new(rect.page_width - peek, y_dest), rigid)
        };

        match self.settings.cover_lift {
            Some(lift) if rigid => {
                self.begin_animation(line_points(from, to), lift, FinishAction::HoldCorner, now)
            }
            _ => self.animate_to(sink, from, to, FinishAction::HoldCorner, now),
        }
    }

    /// Reverse a corner peek when the pointer leaves the zone. Soft pages
    /// spring back through the normal release path; rigid covers ease down
    /// on the same clock that lifted them.
    fn lower_corner(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        now: Instant,
    ) {
        self.set_phase(FlipPhase::Read);
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let pos = session.calc.position();
        let rigid = collection
            .page(session.pages.flipping)
            .map(|p| p.drawing_density())
            == Some(PageDensity::Hard);

        match self.settings.cover_lift {
            Some(lift) if rigid => {
                self.set_phase(FlipPhase::Flipping);
                let edge = Point::new(sink.rect().page_width, pos.y);
                self.begin_animation(line_points(pos, edge), lift, FinishAction::Release, now);
            }
            _ => self.stop_move(sink, now),
        }
    }

    /// Release the fold: commit when it has crossed the spine, spring back
    /// otherwise.
    pub fn stop_move(&mut self, sink: &mut dyn RenderSink, now: Instant) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let pos = session.calc.position();
        let page_width = sink.rect().page_width;

        self.set_phase(FlipPhase::Flipping);
        if pos.x <= 0.0 {
            self.animate_to(
                sink,
                pos,
                Point::new(-page_width, pos.y),
                FinishAction::Commit,
                now,
            );
        } else {
            self.animate_to(
                sink,
                pos,
                Point::new(page_width, pos.y),
                FinishAction::Release,
                now,
            );
        }
    }

    // ── frame driving ──────────────────────────────────────────

    /// Advance any running animation. Returns whether the visible state
    /// changed.
    pub fn tick(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        now: Instant,
    ) -> bool {
        match self.animator.tick(now) {
            AnimationTick::Idle => false,
            AnimationTick::Frame(pos) => {
                self.apply_fold(collection, sink, pos);
                true
            }
            AnimationTick::Finished(pos) => {
                self.apply_fold(collection, sink, pos);
                self.complete(collection, sink);
                true
            }
        }
    }

    /// Fast-forward the current animation to its end and run its
    /// completion, committing any pending turn.
    pub fn finish_animation(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
    ) {
        if let Some(last) = self.animator.finish_now() {
            self.apply_fold(collection, sink, last);
            self.complete(collection, sink);
        }
    }

    /// Force the engine back to rest, completing any in-flight turn first.
    /// Used when the book geometry changes under a live session.
    pub fn reset(&mut self, collection: &mut PageCollection, sink: &mut dyn RenderSink) {
        self.finish_animation(collection, sink);
        self.clear(collection, sink);
    }

    // ── session internals ──────────────────────────────────────

    /// Engage a new session for the touch at `global`. Refuses at the book
    /// boundaries. In landscape, a density mismatch between the flipping
    /// page and its neighbor forces both rigid for the session, so the two
    /// faces of one physical sheet move as one.
    fn start(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        global: Point,
    ) -> bool {
        self.clear(collection, sink);

        let rect = sink.rect();
        let book_pos = sink.convert_to_book(global);
        let direction = self.direction_for(sink, book_pos);
        let corner = if book_pos.y >= rect.height / 2.0 {
            FlipCorner::Bottom
        } else {
            FlipCorner::Top
        };

        if !collection.can_turn(direction) {
            tracing::debug!(?direction, "turn refused at book boundary");
            return false;
        }
        let Some(pages) = collection.turn_participants(sink.orientation(), direction) else {
            return false;
        };

        let mut hardened = Vec::new();
        if sink.orientation() == Orientation::Landscape {
            let neighbor = match direction {
                FlipDirection::Forward => collection.prev_of(pages.flipping),
                FlipDirection::Back => collection.next_of(pages.flipping),
            };
            if let Some(neighbor) = neighbor {
                let densities = (
                    collection.page(pages.flipping).map(|p| p.density()),
                    collection.page(neighbor).map(|p| p.density()),
                );
                if let (Some(a), Some(b)) = densities {
                    if a != b {
                        for id in [pages.flipping, neighbor] {
                            if let Some(page) = collection.page_mut(id) {
                                page.set_drawing_density(PageDensity::Hard);
                            }
                        }
                        hardened.extend([pages.flipping, neighbor]);
                    }
                }
            }
        }

        sink.set_direction(direction);
        tracing::debug!(?direction, ?corner, ?pages, "fold session engaged");
        self.session = Some(Session {
            calc: FlipCalc::new(direction, corner, rect.page_width, rect.height),
            pages,
            hardened,
        });
        true
    }

    /// Run the fold math for one touch position and push the results into
    /// the page states and the sink. A rejected position leaves the
    /// previous frame standing.
    fn apply_fold(
        &mut self,
        collection: &mut PageCollection,
        sink: &mut dyn RenderSink,
        pos: Point,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.calc.calc(pos) {
            return;
        }
        let progress = session.calc.progress();

        if let Some(page) = collection.page_mut(session.pages.bottom) {
            page.state.clip = session.calc.bottom_clip();
            page.state.position = session.calc.bottom_page_position();
            page.state.angle = 0.0;
            page.state.hard_angle = 0.0;
        }
        if let Some(page) = collection.page_mut(session.pages.flipping) {
            page.state.clip = session.calc.flipping_clip();
            page.state.position = session.calc.active_corner();
            page.state.angle = session.calc.angle();
            page.state.hard_angle = session.calc.hard_angle();
        }

        sink.set_page_rect(session.calc.sheet());
        sink.set_bottom_page(Some(session.pages.bottom));
        sink.set_flipping_page(Some(session.pages.flipping));
        match session.calc.shadow_origin() {
            Some(origin) => sink.set_shadow(ShadowData {
                origin,
                angle: session.calc.shadow_angle(),
                progress,
                direction: session.calc.direction(),
            }),
            None => sink.clear_shadow(),
        }
    }

    /// Run the finish action of the animation that just ended.
    fn complete(&mut self, collection: &mut PageCollection, sink: &mut dyn RenderSink) {
        let Some(action) = self.pending.take() else {
            return;
        };
        match action {
            FinishAction::Commit => {
                let direction = self.session.as_ref().map(|s| s.calc.direction());
                match direction {
                    Some(FlipDirection::Forward) => {
                        let _ = collection.show_next(sink.orientation());
                    }
                    Some(FlipDirection::Back) => {
                        let _ = collection.show_prev(sink.orientation());
                    }
                    None => {}
                }
                tracing::debug!(
                    ?direction,
                    page = collection.current_page(),
                    "turn committed"
                );
                self.clear(collection, sink);
            }
            FinishAction::Release => {
                tracing::debug!("turn released without committing");
                self.clear(collection, sink);
            }
            FinishAction::HoldCorner => {}
        }
    }

    /// Dismantle the session: restore page state and drawing densities,
    /// release the ephemeral copy, empty the sink's dynamic slots.
    fn clear(&mut self, collection: &mut PageCollection, sink: &mut dyn RenderSink) {
        if let Some(session) = self.session.take() {
            let mut touched = vec![session.pages.flipping, session.pages.bottom];
            touched.extend(session.hardened);
            for id in touched {
                if let Some(page) = collection.page_mut(id) {
                    page.reset_drawing_density();
                    page.state = PageState::default();
                }
            }
        }
        collection.release_temporary();
        sink.set_flipping_page(None);
        sink.set_bottom_page(None);
        sink.clear_shadow();
        self.pending = None;
        self.set_phase(FlipPhase::Read);
    }

    // ── animation plumbing ─────────────────────────────────────

    fn animate_to(
        &mut self,
        sink: &mut dyn RenderSink,
        from: Point,
        to: Point,
        action: FinishAction,
        now: Instant,
    ) {
        let frames = line_points(from, to);
        let duration = self.turn_duration(sink.rect().page_width, frames.len());
        self.begin_animation(frames, duration, action, now);
    }

    fn begin_animation(
        &mut self,
        frames: Vec<Point>,
        duration: Duration,
        action: FinishAction,
        now: Instant,
    ) {
        self.animator.schedule(frames, duration, now);
        self.pending = Some(action);
    }

    /// Scale the configured duration by path length, normalized to a
    /// reference page width so cell-sized books still turn at a readable
    /// pace. Long paths cap at the full configured duration.
    fn turn_duration(&self, page_width: f64, steps: usize) -> Duration {
        let normalized = steps as f64 * (REFERENCE_PAGE_WIDTH / page_width.max(1.0));
        let fraction = (normalized / 1000.0).min(1.0);
        self.settings.flip_duration.mul_f64(fraction)
    }

    // ── geometry helpers ───────────────────────────────────────

    fn direction_for(&self, sink: &dyn RenderSink, book_pos: Point) -> FlipDirection {
        let rect = sink.rect();
        let back = match sink.orientation() {
            Orientation::Portrait => book_pos.x - rect.page_width <= rect.width / 5.0,
            Orientation::Landscape => book_pos.x < rect.width / 2.0,
        };
        if back {
            FlipDirection::Back
        } else {
            FlipDirection::Forward
        }
    }

    /// Whether `global` sits inside one of the four corner hit zones. The
    /// zone reach is the page diagonal over the configured sensitivity
    /// divisor.
    fn point_on_corners(&self, sink: &dyn RenderSink, global: Point) -> bool {
        let rect = sink.rect();
        let reach = rect.page_diagonal() / self.settings.corner_sensitivity;
        let pos = sink.convert_to_book(global);

        pos.x > 0.0
            && pos.y > 0.0
            && pos.x < rect.width
            && pos.y < rect.height
            && (pos.x < reach || pos.x > rect.width - reach)
            && (pos.y < reach || pos.y > rect.height - reach)
    }

    fn set_phase(&mut self, phase: FlipPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "flip phase change");
            self.phase = phase;
        }
    }
}
