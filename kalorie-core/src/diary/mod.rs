//! Diary rendering, reconciliation and mutations.
//!
//! Authoritative entries live in the [`Store`](crate::store::Store); a
//! [`DiarySurface`] is whatever shows them. [`reconcile`] makes the surface
//! match the entries, [`DiaryController`] applies mutations and resyncs.

mod controller;
mod gesture;
mod reconcile;
mod surface;
mod view;

pub use controller::{DeleteOutcome, DiaryController, DiaryError, Resync};
pub use gesture::{
    SwipeOutcome, SwipeRecognizer, MAX_SWIPE_PX, MIN_SWIPE_DURATION, SWIPE_THRESHOLD_PX,
};
pub use reconcile::{group_entries, reconcile, ReconcileReport};
pub use surface::{
    DiarySurface, EntryVisual, InMemorySurface, MealGroup, RenderedEntry, RenderedMeal,
    LISTENERS_PER_ENTRY,
};
pub use view::DiaryView;
