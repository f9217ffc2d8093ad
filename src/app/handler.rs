//! Input handling — maps key/mouse events to engine calls.
//!
//! The pointer protocol mirrors what readers expect from a page-flip:
//! moving near a corner peeks the fold, dragging grabs it, releasing
//! either springs back or commits, and a short press counts as a click
//! that turns the page in one animated sweep.

use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use kurbo::Point;

use super::state::AppState;
use crate::core::calc::{FlipCorner, FlipDirection};

/// Maximum pointer travel, in cells, for a press to still count as a click.
const CLICK_SLOP: f64 = 2.0;

/// Maximum press duration for a release to still count as a click; a
/// longer hold settles the fold wherever the drag left it.
const CLICK_HOLD: Duration = Duration::from_millis(300);

// ── keyboard ────────────────────────────────────────────────────

pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of anything else.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    state.status_message = None;

    let now = Instant::now();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => state.should_quit = true,

        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => turn_next(state, now),
        KeyCode::Left | KeyCode::Char('h') => turn_prev(state, now),

        KeyCode::Home => {
            state.flip.flip_to_page(
                &mut state.collection,
                &mut state.view,
                0,
                FlipCorner::Bottom,
                now,
            );
        }
        KeyCode::End => {
            let last = state.collection.last_page();
            state.flip.flip_to_page(
                &mut state.collection,
                &mut state.view,
                last,
                FlipCorner::Bottom,
                now,
            );
        }

        _ => {}
    }
}

// ── mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let point = Point::new(f64::from(mouse.column), f64::from(mouse.row));
    let now = Instant::now();

    match mouse.kind {
        // A bare move (no button held) hovers: peek the fold near corners.
        MouseEventKind::Moved => {
            state
                .flip
                .show_corner(&mut state.collection, &mut state.view, point, now);
        }

        MouseEventKind::Down(MouseButton::Left) => {
            state.status_message = None;
            state.press = Some((point, now));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            state.flip.fold(&mut state.collection, &mut state.view, point);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let Some((origin, pressed_at)) = state.press.take() else {
                return;
            };
            if is_click(origin, pressed_at, point, now) {
                state
                    .flip
                    .flip_at(&mut state.collection, &mut state.view, point, now);
            } else {
                state.flip.stop_move(&mut state.view, now);
            }
        }

        MouseEventKind::ScrollUp => turn_prev(state, now),
        MouseEventKind::ScrollDown => turn_next(state, now),

        _ => {}
    }
}

// ── shared helpers ──────────────────────────────────────────────

/// A release is a click when the pointer barely travelled and the button
/// came back up quickly; anything slower settles the fold as a drag.
fn is_click(origin: Point, pressed_at: Instant, point: Point, released_at: Instant) -> bool {
    let travel = (point.x - origin.x).abs().max((point.y - origin.y).abs());
    travel <= CLICK_SLOP && released_at.duration_since(pressed_at) <= CLICK_HOLD
}

/// Turn forward, or surface the boundary in the status bar.
fn turn_next(state: &mut AppState, now: Instant) {
    state.status_message = None;
    if !state.collection.can_turn(FlipDirection::Forward) {
        state.status_message = Some("Already at the back cover".to_string());
        return;
    }
    state.flip.flip_next(
        &mut state.collection,
        &mut state.view,
        FlipCorner::Bottom,
        now,
    );
}

/// Turn back, or surface the boundary in the status bar.
fn turn_prev(state: &mut AppState, now: Instant) {
    state.status_message = None;
    if !state.collection.can_turn(FlipDirection::Back) {
        state.status_message = Some("Already at the front cover".to_string());
        return;
    }
    state.flip.flip_prev(
        &mut state.collection,
        &mut state.view,
        FlipCorner::Bottom,
        now,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flip::FlipPhase;
    use crate::core::settings::Settings;
    use crate::ui::content::SampleBook;
    use ratatui::layout::Rect;

    fn fixture() -> AppState {
        let mut state = AppState::new(SampleBook::generate(10), Settings::default(), None)
            .expect("non-empty book");
        // Book lands at columns 1..83, rows 1..25; spine at column 42.
        state.view.layout(Rect::new(0, 0, 84, 26));
        state
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn quit_keys_set_the_flag() {
        let mut state = fixture();
        handle_key(&mut state, KeyEvent::from(KeyCode::Char('q')));
        assert!(state.should_quit);

        let mut state = fixture();
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }

    #[test]
    fn arrow_keys_drive_animated_turns() {
        let mut state = fixture();
        handle_key(&mut state, KeyEvent::from(KeyCode::Right));
        assert!(state.flip.is_animating());

        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 1);

        handle_key(&mut state, KeyEvent::from(KeyCode::Left));
        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 0);
    }

    #[test]
    fn home_and_end_jump_across_the_book() {
        let mut state = fixture();
        handle_key(&mut state, KeyEvent::from(KeyCode::End));
        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 9);

        handle_key(&mut state, KeyEvent::from(KeyCode::Home));
        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 0);
    }

    #[test]
    fn a_stationary_press_is_a_click_turn() {
        let mut state = fixture();
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Down(MouseButton::Left), 82, 24),
        );
        assert!(state.press.is_some());

        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Up(MouseButton::Left), 82, 24),
        );
        assert!(state.press.is_none());
        assert!(state.flip.is_animating());

        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 1);
    }

    #[test]
    fn a_travelled_drag_settles_the_fold_instead_of_clicking() {
        let mut state = fixture();
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Down(MouseButton::Left), 80, 24),
        );
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Drag(MouseButton::Left), 60, 20),
        );
        assert_eq!(state.flip.phase(), FlipPhase::UserFold);

        // Released far from the press but still right of the spine: the
        // sheet springs back without committing.
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Up(MouseButton::Left), 60, 20),
        );
        assert_eq!(state.flip.phase(), FlipPhase::Flipping);

        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 0);
    }

    #[test]
    fn a_held_or_travelled_press_is_not_a_click() {
        let at = Instant::now();
        let press = Point::new(82.0, 24.0);

        assert!(is_click(
            press,
            at,
            Point::new(83.0, 24.0),
            at + Duration::from_millis(100)
        ));
        // Too far.
        assert!(!is_click(
            press,
            at,
            Point::new(60.0, 20.0),
            at + Duration::from_millis(100)
        ));
        // Too slow.
        assert!(!is_click(press, at, press, at + Duration::from_millis(400)));
    }

    #[test]
    fn boundary_turns_surface_a_status_notice() {
        let mut state = fixture();
        handle_key(&mut state, KeyEvent::from(KeyCode::Left));
        assert_eq!(
            state.status_message.as_deref(),
            Some("Already at the front cover")
        );
        assert_eq!(state.collection.current_page(), 0);
        assert!(!state.flip.is_active());

        // A turn that goes through dismisses the notice.
        handle_key(&mut state, KeyEvent::from(KeyCode::Right));
        assert!(state.status_message.is_none());
        assert!(state.flip.is_animating());
    }

    #[test]
    fn scroll_wheel_pages_through_the_book() {
        let mut state = fixture();
        handle_mouse(&mut state, mouse(MouseEventKind::ScrollDown, 40, 12));
        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 1);

        handle_mouse(&mut state, mouse(MouseEventKind::ScrollUp, 40, 12));
        state
            .flip
            .finish_animation(&mut state.collection, &mut state.view);
        assert_eq!(state.collection.current_page(), 0);
    }
}
