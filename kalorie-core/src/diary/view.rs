use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::reconcile::reconcile;
use super::surface::DiarySurface;
use crate::debounce::Debouncer;
use crate::store::{Slice, Store, Subscription};

/// Keeps a surface reconciled with the store's diary slice.
pub struct DiaryView;

impl DiaryView {
    /// Reconciles `surface` now and after every diary update until the
    /// returned subscription is cleaned up or dropped.
    pub fn mount<S>(store: &Arc<Store>, surface: Arc<Mutex<S>>) -> Subscription
    where
        S: DiarySurface + 'static,
    {
        {
            let entries = store.diary().entries;
            let mut guard = surface.lock().unwrap_or_else(PoisonError::into_inner);
            reconcile(&mut *guard, &entries);
        }

        store.subscribe_guarded(Slice::Diary, move |snapshot| {
            let mut guard = surface.lock().unwrap_or_else(PoisonError::into_inner);
            reconcile(&mut *guard, &snapshot.diary.entries);
        })
    }

    /// Like [`mount`](Self::mount), but a burst of diary updates within
    /// `delay` is reconciled once, from the latest entries.
    ///
    /// Dropping the subscription also drops any pending reconcile. Must be
    /// called from within a Tokio runtime.
    pub fn mount_debounced<S>(
        store: &Arc<Store>,
        surface: Arc<Mutex<S>>,
        delay: Duration,
    ) -> Subscription
    where
        S: DiarySurface + 'static,
    {
        {
            let entries = store.diary().entries;
            let mut guard = surface.lock().unwrap_or_else(PoisonError::into_inner);
            reconcile(&mut *guard, &entries);
        }

        let debouncer = Debouncer::new(delay);
        let weak = Arc::downgrade(store);
        store.subscribe_guarded(Slice::Diary, move |_| {
            let weak = weak.clone();
            let surface = Arc::clone(&surface);
            debouncer.trigger(move || async move {
                let Some(store) = weak.upgrade() else {
                    return;
                };
                let entries = store.diary().entries;
                let mut guard = surface.lock().unwrap_or_else(PoisonError::into_inner);
                reconcile(&mut *guard, &entries);
            });
        })
    }
}
