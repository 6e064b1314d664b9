//! Swipe-left recognition for diary entries.
//!
//! The recognizer only decides whether a swipe happened. Animating the
//! element and deleting the entry are up to the callbacks.

use std::fmt;
use std::time::{Duration, Instant};

use crate::events::{AppEvent, EventBus};
use crate::models::EntryId;

pub const SWIPE_THRESHOLD_PX: f64 = 50.0;
pub const MAX_SWIPE_PX: f64 = 80.0;
pub const MIN_SWIPE_DURATION: Duration = Duration::from_millis(100);

type SwipeCallback = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Far and slow enough to the left
    Triggered,
    /// Released short of the threshold, too quickly, or cancelled
    Cancelled,
    /// Released without a preceding press
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start_x: f64,
    current_x: f64,
    started_at: Instant,
    moved: bool,
}

pub struct SwipeRecognizer {
    threshold: f64,
    max_travel: f64,
    min_duration: Duration,
    press: Option<Press>,
    on_threshold_crossed: Option<SwipeCallback>,
    on_cancel: Option<SwipeCallback>,
}

impl fmt::Debug for SwipeRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeRecognizer")
            .field("threshold", &self.threshold)
            .field("max_travel", &self.max_travel)
            .field("min_duration", &self.min_duration)
            .field("press", &self.press)
            .finish_non_exhaustive()
    }
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeRecognizer {
    pub fn new() -> Self {
        Self {
            threshold: SWIPE_THRESHOLD_PX,
            max_travel: MAX_SWIPE_PX,
            min_duration: MIN_SWIPE_DURATION,
            press: None,
            on_threshold_crossed: None,
            on_cancel: None,
        }
    }

    /// A recognizer whose completed swipe publishes `DeleteEntry` for
    /// `entry_id` on `bus`.
    pub fn deleting(entry_id: EntryId, bus: &EventBus) -> Self {
        let bus = bus.clone();
        Self::new().on_swipe_threshold_crossed(move || {
            bus.publish(AppEvent::DeleteEntry { entry_id });
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_travel(mut self, max_travel: f64) -> Self {
        self.max_travel = max_travel;
        self
    }

    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn on_swipe_threshold_crossed(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_threshold_crossed = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub fn is_tracking(&self) -> bool {
        self.press.is_some()
    }

    pub fn press(&mut self, x: f64, at: Instant) {
        self.press = Some(Press {
            start_x: x,
            current_x: x,
            started_at: at,
            moved: false,
        });
    }

    /// Tracks the pointer. Returns the horizontal offset to show, which is
    /// never positive and never beyond the maximum travel.
    pub fn move_to(&mut self, x: f64) -> Option<f64> {
        let max_travel = self.max_travel;
        let press = self.press.as_mut()?;
        press.current_x = x;

        let delta = x - press.start_x;
        if delta < 0.0 {
            press.moved = true;
            Some(-delta.abs().min(max_travel))
        } else {
            Some(0.0)
        }
    }

    pub fn release(&mut self, at: Instant) -> SwipeOutcome {
        let Some(press) = self.press.take() else {
            return SwipeOutcome::Ignored;
        };

        let delta = press.current_x - press.start_x;
        let elapsed = at.saturating_duration_since(press.started_at);
        if press.moved && delta < -self.threshold && elapsed > self.min_duration {
            if let Some(callback) = self.on_threshold_crossed.as_mut() {
                callback();
            }
            SwipeOutcome::Triggered
        } else {
            self.fire_cancel();
            SwipeOutcome::Cancelled
        }
    }

    /// Abandons the current gesture, e.g. when the pointer is lost.
    pub fn cancel(&mut self) {
        if self.press.take().is_some() {
            self.fire_cancel();
        }
    }

    fn fire_cancel(&mut self) {
        if let Some(callback) = self.on_cancel.as_mut() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, SwipeRecognizer) {
        let crossed = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));
        let c = crossed.clone();
        let x = cancelled.clone();
        let recognizer = SwipeRecognizer::new()
            .on_swipe_threshold_crossed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .on_cancel(move || {
                x.fetch_add(1, Ordering::SeqCst);
            });
        (crossed, cancelled, recognizer)
    }

    #[test]
    fn test_left_swipe_past_threshold_triggers() {
        let (crossed, cancelled, mut swipe) = counting();
        let start = Instant::now();

        swipe.press(200.0, start);
        assert_eq!(swipe.move_to(170.0), Some(-30.0));
        assert_eq!(swipe.move_to(140.0), Some(-60.0));
        assert_eq!(swipe.release(start + Duration::from_millis(250)), SwipeOutcome::Triggered);

        assert_eq!(crossed.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
        assert!(!swipe.is_tracking());
    }

    #[test]
    fn test_offset_is_capped() {
        let (_, _, mut swipe) = counting();
        swipe.press(300.0, Instant::now());
        assert_eq!(swipe.move_to(100.0), Some(-80.0));
        // right swipes do not move the element
        assert_eq!(swipe.move_to(350.0), Some(0.0));
    }

    #[test]
    fn test_short_swipe_cancels() {
        let (crossed, cancelled, mut swipe) = counting();
        let start = Instant::now();

        swipe.press(200.0, start);
        swipe.move_to(160.0);
        assert_eq!(swipe.release(start + Duration::from_millis(300)), SwipeOutcome::Cancelled);

        // exactly at the threshold is not enough
        swipe.press(200.0, start);
        swipe.move_to(150.0);
        assert_eq!(swipe.release(start + Duration::from_millis(300)), SwipeOutcome::Cancelled);

        assert_eq!(crossed.load(Ordering::SeqCst), 0);
        assert_eq!(cancelled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fast_flick_cancels() {
        let (crossed, _, mut swipe) = counting();
        let start = Instant::now();

        swipe.press(200.0, start);
        swipe.move_to(100.0);
        assert_eq!(swipe.release(start + Duration::from_millis(60)), SwipeOutcome::Cancelled);
        assert_eq!(crossed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_right_swipe_never_triggers() {
        let (crossed, _, mut swipe) = counting();
        let start = Instant::now();

        swipe.press(100.0, start);
        swipe.move_to(250.0);
        assert_eq!(swipe.release(start + Duration::from_millis(300)), SwipeOutcome::Cancelled);
        assert_eq!(crossed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_without_press_and_cancel() {
        let (_, cancelled, mut swipe) = counting();
        assert_eq!(swipe.release(Instant::now()), SwipeOutcome::Ignored);
        assert!(swipe.move_to(10.0).is_none());

        swipe.cancel();
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);

        swipe.press(10.0, Instant::now());
        swipe.cancel();
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        assert!(!swipe.is_tracking());
    }
}
