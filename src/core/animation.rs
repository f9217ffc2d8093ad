//! Tick-driven frame scheduling.
//!
//! A scheduled run is a precomputed list of fold positions spread evenly
//! over a wall-clock duration. The owner polls [`Animator::tick`] from its
//! frame loop; each poll yields at most the latest due frame, so a slow
//! loop skips intermediate frames instead of lagging behind, and a fast
//! loop gets `Idle` until the next frame falls due. Emission is monotonic:
//! a frame index is never yielded twice and never after a later one.

use std::time::{Duration, Instant};

use kurbo::Point;

/// Result of polling the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationTick {
    /// Nothing scheduled, or no new frame due yet.
    Idle,
    /// The latest due frame.
    Frame(Point),
    /// The run has used up its duration; this is its final frame.
    Finished(Point),
}

struct Run {
    frames: Vec<Point>,
    started_at: Instant,
    /// Wall-clock share of one frame (`duration / frames.len()`).
    frame_time: Duration,
    /// Frames already emitted; the next yield must be at this index or
    /// later.
    emitted: usize,
}

impl Run {
    fn due_index(&self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.frame_time.is_zero() {
            self.frames.len()
        } else {
            (elapsed.as_secs_f64() / self.frame_time.as_secs_f64()) as usize
        }
    }

    fn last_frame(&self) -> Point {
        // Runs are only constructed non-empty.
        self.frames[self.frames.len() - 1]
    }
}

/// Schedules one frame run at a time. Replacing a run discards the old
/// one silently; owners that need the old run's final frame first should
/// call [`Animator::finish_now`] before scheduling.
#[derive(Default)]
pub struct Animator {
    run: Option<Run>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `frames` spread evenly over `duration`, starting at `now`.
    /// An empty frame list clears any current run instead.
    pub fn schedule(&mut self, frames: Vec<Point>, duration: Duration, now: Instant) {
        if frames.is_empty() {
            self.run = None;
            return;
        }
        let frame_time = duration.div_f64(frames.len() as f64);
        self.run = Some(Run {
            frames,
            started_at: now,
            frame_time,
            emitted: 0,
        });
    }

    /// Poll for the latest due frame. After [`AnimationTick::Finished`] the
    /// animator is idle again.
    pub fn tick(&mut self, now: Instant) -> AnimationTick {
        let Some(run) = self.run.as_mut() else {
            return AnimationTick::Idle;
        };

        let due = run.due_index(now);
        if due >= run.frames.len() {
            let last = run.last_frame();
            self.run = None;
            return AnimationTick::Finished(last);
        }
        if due < run.emitted {
            return AnimationTick::Idle;
        }
        run.emitted = due + 1;
        AnimationTick::Frame(run.frames[due])
    }

    /// Fast-forward the current run to its end. Returns its final frame,
    /// or `None` when idle.
    pub fn finish_now(&mut self) -> Option<Point> {
        self.run.take().map(|run| run.last_frame())
    }

    /// Drop the current run without reaching its end.
    pub fn cancel(&mut self) {
        self.run = None;
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn frames_come_out_in_order_as_time_passes() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(4), Duration::from_millis(400), start);

        assert_eq!(anim.tick(start), AnimationTick::Frame(Point::new(0.0, 0.0)));
        assert_eq!(anim.tick(start), AnimationTick::Idle);
        assert_eq!(
            anim.tick(start + Duration::from_millis(100)),
            AnimationTick::Frame(Point::new(1.0, 0.0))
        );
        assert_eq!(
            anim.tick(start + Duration::from_millis(250)),
            AnimationTick::Frame(Point::new(2.0, 0.0))
        );
        assert!(anim.is_active());
    }

    #[test]
    fn a_slow_poller_skips_straight_to_the_latest_due_frame() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(10), Duration::from_millis(1000), start);

        assert_eq!(
            anim.tick(start + Duration::from_millis(750)),
            AnimationTick::Frame(Point::new(7.0, 0.0))
        );
    }

    #[test]
    fn the_run_finishes_once_its_duration_is_spent() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(4), Duration::from_millis(400), start);

        assert_eq!(
            anim.tick(start + Duration::from_millis(400)),
            AnimationTick::Finished(Point::new(3.0, 0.0))
        );
        assert!(!anim.is_active());
        assert_eq!(anim.tick(start + Duration::from_millis(500)), AnimationTick::Idle);
    }

    #[test]
    fn zero_duration_runs_finish_on_the_first_poll() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(4), Duration::ZERO, start);

        assert_eq!(
            anim.tick(start),
            AnimationTick::Finished(Point::new(3.0, 0.0))
        );
    }

    #[test]
    fn finish_now_fast_forwards_to_the_final_frame() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(4), Duration::from_millis(400), start);

        assert_eq!(anim.finish_now(), Some(Point::new(3.0, 0.0)));
        assert!(!anim.is_active());
        assert_eq!(anim.finish_now(), None);
    }

    #[test]
    fn cancel_discards_the_run_without_a_final_frame() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(4), Duration::from_millis(400), start);

        anim.cancel();
        assert!(!anim.is_active());
        assert_eq!(anim.tick(start + Duration::from_millis(400)), AnimationTick::Idle);
    }

    #[test]
    fn an_empty_frame_list_clears_the_animator() {
        let start = Instant::now();
        let mut anim = Animator::new();
        anim.schedule(frames(4), Duration::from_millis(400), start);
        anim.schedule(Vec::new(), Duration::from_millis(400), start);

        assert!(!anim.is_active());
    }
}
