//! Reactive application state.
//!
//! The [`Store`] owns the [`AppSnapshot`], hands out copies, and notifies
//! subscribers per slice whenever a slice is replaced. Loads go through an
//! injected [`CalorieApi`] and are sequenced per slice so a slow response
//! can never overwrite a newer one.

mod formatted;
mod slice;
mod snapshot;

pub use formatted::{format_number, FormattedGoals, FormattedMacro, FormattedValue};
pub use slice::Slice;
pub use snapshot::{AppSnapshot, DailySummary, FALLBACK_GOAL_CALORIES};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use chrono::NaiveDate;

use crate::api::{ApiError, CalorieApi};
use crate::models::{DiaryDay, ExerciseEntry, Food, Goals, WeightEntry};

type Callback = Arc<dyn Fn(&AppSnapshot) + Send + Sync>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Unsubscribes when dropped or when [`cleanup`](Self::cleanup) is called.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<Store>,
    slice: Slice,
    id: Option<SubscriptionId>,
}

impl Subscription {
    pub fn slice(&self) -> Slice {
        self.slice
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cleanup(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(store) = self.store.upgrade() {
                store.unsubscribe(self.slice, id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("slice", &self.slice)
            .field("id", &self.id)
            .finish()
    }
}

/// What happened to the response of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The slice was replaced with the response
    Applied,
    /// A newer load for the same slice was issued; the response was dropped
    Stale,
    /// The backend has nothing stored for the slice; the slice is unchanged
    Missing,
    /// The request failed; the slice is unchanged
    Failed,
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Applied => write!(f, "applied"),
            LoadOutcome::Stale => write!(f, "stale"),
            LoadOutcome::Missing => write!(f, "missing"),
            LoadOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Outcomes of [`Store::load_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadAllOutcome {
    pub foods: LoadOutcome,
    pub diary: LoadOutcome,
    pub exercises: LoadOutcome,
    pub weights: LoadOutcome,
    pub goals: LoadOutcome,
}

impl LoadAllOutcome {
    pub fn all_applied(&self) -> bool {
        self.outcomes().iter().all(|o| *o == LoadOutcome::Applied)
    }

    /// Whether any request failed outright.
    pub fn any_failed(&self) -> bool {
        self.outcomes().contains(&LoadOutcome::Failed)
    }

    fn outcomes(&self) -> [LoadOutcome; 5] {
        [
            self.foods,
            self.diary,
            self.exercises,
            self.weights,
            self.goals,
        ]
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_slice: [Vec<(SubscriptionId, Callback)>; 5],
}

pub struct Store {
    state: RwLock<AppSnapshot>,
    listeners: Mutex<Listeners>,
    load_seq: [AtomicU64; 5],
    api: Arc<dyn CalorieApi>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Creates an empty store backed by `api`.
    pub fn new(api: Arc<dyn CalorieApi>) -> Self {
        Self {
            state: RwLock::new(AppSnapshot::default()),
            listeners: Mutex::new(Listeners::default()),
            load_seq: Default::default(),
            api,
        }
    }

    pub fn api(&self) -> Arc<dyn CalorieApi> {
        Arc::clone(&self.api)
    }

    // --- subscriptions ---

    /// Registers `callback` to run with the full snapshot whenever `slice` is
    /// replaced. Callbacks for a slice run in registration order.
    pub fn subscribe<F>(&self, slice: Slice, callback: F) -> SubscriptionId
    where
        F: Fn(&AppSnapshot) + Send + Sync + 'static,
    {
        let mut listeners = self.lock_listeners();
        listeners.next_id += 1;
        let id = SubscriptionId(listeners.next_id);
        listeners.by_slice[slice.index()].push((id, Arc::new(callback)));
        id
    }

    /// Like [`subscribe`](Self::subscribe), returning a guard that
    /// unsubscribes on drop.
    pub fn subscribe_guarded<F>(self: &Arc<Self>, slice: Slice, callback: F) -> Subscription
    where
        F: Fn(&AppSnapshot) + Send + Sync + 'static,
    {
        let id = self.subscribe(slice, callback);
        Subscription {
            store: Arc::downgrade(self),
            slice,
            id: Some(id),
        }
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, slice: Slice, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let callbacks = &mut listeners.by_slice[slice.index()];
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    pub fn subscriber_count(&self, slice: Slice) -> usize {
        self.lock_listeners().by_slice[slice.index()].len()
    }

    // --- reads ---

    /// Returns a copy of the whole snapshot.
    pub fn state(&self) -> AppSnapshot {
        self.read().clone()
    }

    pub fn foods(&self) -> Vec<Food> {
        self.read().foods.clone()
    }

    pub fn diary(&self) -> DiaryDay {
        self.read().diary.clone()
    }

    pub fn exercises(&self) -> Vec<ExerciseEntry> {
        self.read().exercises.clone()
    }

    pub fn weights(&self) -> Vec<WeightEntry> {
        self.read().weights.clone()
    }

    pub fn goals(&self) -> Option<Goals> {
        self.read().goals
    }

    /// Goals formatted for display, or `None` until goals are loaded.
    pub fn formatted_goals(&self) -> Option<FormattedGoals> {
        self.goals().map(|g| FormattedGoals::from_goals(&g))
    }

    pub fn daily_summary(&self) -> DailySummary {
        self.read().daily_summary()
    }

    // --- writes ---

    pub fn set_foods(&self, foods: Vec<Food>) {
        self.replace(Slice::Foods, |s| s.foods = foods);
    }

    pub fn set_diary(&self, diary: DiaryDay) {
        self.replace(Slice::Diary, |s| s.diary = diary);
    }

    pub fn set_exercises(&self, exercises: Vec<ExerciseEntry>) {
        self.replace(Slice::Exercises, |s| s.exercises = exercises);
    }

    pub fn set_weights(&self, weights: Vec<WeightEntry>) {
        self.replace(Slice::Weights, |s| s.weights = weights);
    }

    pub fn set_goals(&self, goals: Goals) {
        self.replace(Slice::Goals, |s| s.goals = Some(goals));
    }

    // --- loads ---

    pub async fn load_foods(&self) -> LoadOutcome {
        let seq = self.begin_load(Slice::Foods);
        let result = self.api.get_foods().await;
        self.finish_load(Slice::Foods, seq, result, |s, foods| s.foods = foods)
    }

    pub async fn load_diary(&self, date: NaiveDate) -> LoadOutcome {
        let seq = self.begin_load(Slice::Diary);
        let result = self.api.get_diary_entries(date).await;
        self.finish_load(Slice::Diary, seq, result, |s, entries| {
            s.diary = DiaryDay::new(date, entries)
        })
    }

    pub async fn load_exercises(&self, date: NaiveDate) -> LoadOutcome {
        let seq = self.begin_load(Slice::Exercises);
        let result = self.api.get_exercises(date).await;
        self.finish_load(Slice::Exercises, seq, result, |s, exercises| {
            s.exercises = exercises
        })
    }

    pub async fn load_weights(&self) -> LoadOutcome {
        let seq = self.begin_load(Slice::Weights);
        let result = self.api.get_weights().await;
        self.finish_load(Slice::Weights, seq, result, |s, weights| s.weights = weights)
    }

    pub async fn load_goals(&self) -> LoadOutcome {
        let seq = self.begin_load(Slice::Goals);
        let result = self.api.get_goals().await;
        self.finish_load(Slice::Goals, seq, result, |s, goals| s.goals = Some(goals))
    }

    /// Loads every slice concurrently; `date` scopes diary and exercises.
    pub async fn load_all(&self, date: NaiveDate) -> LoadAllOutcome {
        let (foods, diary, exercises, weights, goals) = futures::join!(
            self.load_foods(),
            self.load_diary(date),
            self.load_exercises(date),
            self.load_weights(),
            self.load_goals(),
        );
        LoadAllOutcome {
            foods,
            diary,
            exercises,
            weights,
            goals,
        }
    }

    fn begin_load(&self, slice: Slice) -> u64 {
        self.load_seq[slice.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    fn finish_load<T>(
        &self,
        slice: Slice,
        seq: u64,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&mut AppSnapshot, T),
    ) -> LoadOutcome {
        let value = match result {
            Ok(value) => value,
            Err(_) if !self.is_latest(slice, seq) => return LoadOutcome::Stale,
            Err(e) if e.is_not_found() => {
                tracing::debug!(%slice, error = %e, "nothing stored for slice");
                return LoadOutcome::Missing;
            }
            Err(e) => {
                tracing::warn!(%slice, error = %e, "failed to load slice");
                return LoadOutcome::Failed;
            }
        };

        {
            let mut state = self.write();
            // Checked under the write lock so a newer response applied in
            // between is never overwritten.
            if !self.is_latest(slice, seq) {
                tracing::debug!(%slice, seq, "discarding stale load");
                return LoadOutcome::Stale;
            }
            apply(&mut state, value);
        }
        tracing::debug!(%slice, seq, "slice loaded");
        self.notify(slice);
        LoadOutcome::Applied
    }

    fn is_latest(&self, slice: Slice, seq: u64) -> bool {
        self.load_seq[slice.index()].load(Ordering::SeqCst) == seq
    }

    fn replace(&self, slice: Slice, apply: impl FnOnce(&mut AppSnapshot)) {
        apply(&mut self.write());
        tracing::debug!(%slice, "slice updated");
        self.notify(slice);
    }

    /// Runs the subscribers of `slice` with no lock held.
    fn notify(&self, slice: Slice) {
        let callbacks: Vec<Callback> = self.lock_listeners().by_slice[slice.index()]
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        if callbacks.is_empty() {
            return;
        }

        let snapshot = self.state();
        for callback in callbacks {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(&snapshot)));
            if result.is_err() {
                tracing::error!(%slice, "subscriber panicked");
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AppSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AppSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::models::{DiaryEntry, MealType};
    use std::sync::atomic::AtomicUsize;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn entry(id: i64, kcal: f64) -> DiaryEntry {
        DiaryEntry::new(id, id * 10, 100.0, MealType::Lunch).with_calories(kcal)
    }

    fn store_with(api: FakeApi) -> (Arc<FakeApi>, Arc<Store>) {
        let api = Arc::new(api);
        let store = Arc::new(Store::new(api.clone()));
        (api, store)
    }

    #[test]
    fn test_initial_state_is_empty() {
        let (_, store) = store_with(FakeApi::new());
        let state = store.state();
        assert!(state.diary.date.is_none());
        assert!(state.diary.entries.is_empty());
        assert!(state.foods.is_empty());
        assert!(state.goals.is_none());
        assert!(store.formatted_goals().is_none());
    }

    #[test]
    fn test_returned_copies_do_not_alias_store() {
        let (_, store) = store_with(FakeApi::new());
        store.set_diary(DiaryDay::new(date(), vec![entry(1, 100.0)]));

        let mut copy = store.diary();
        copy.entries.clear();
        copy.entries.push(entry(99, 1.0));

        let mut whole = store.state();
        whole.diary.entries.clear();
        whole.goals = Some(Goals::default());

        assert_eq!(store.diary().entries, vec![entry(1, 100.0)]);
        assert!(store.goals().is_none());
    }

    #[test]
    fn test_notifications_are_slice_scoped() {
        let (_, store) = store_with(FakeApi::new());
        let diary_calls = Arc::new(AtomicUsize::new(0));
        let goals_calls = Arc::new(AtomicUsize::new(0));

        let counter = diary_calls.clone();
        store.subscribe(Slice::Diary, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = goals_calls.clone();
        store.subscribe(Slice::Goals, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set_goals(Goals::default());
        assert_eq!(diary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(goals_calls.load(Ordering::SeqCst), 1);

        store.set_diary(DiaryDay::new(date(), vec![]));
        store.set_foods(vec![]);
        assert_eq!(diary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(goals_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribers_run_in_registration_order_with_new_state() {
        let (_, store) = store_with(FakeApi::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            store.subscribe(Slice::Goals, move |snapshot| {
                let kcal = snapshot.goals.map(|g| g.daily_calories).unwrap_or(0.0);
                seen.lock().unwrap().push((tag, kcal));
            });
        }

        store.set_goals(Goals::new(1800.0, 100.0, 200.0, 60.0));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 1800.0), ("second", 1800.0)]
        );
    }

    #[test]
    fn test_subscriber_can_read_store() {
        let (_, store) = store_with(FakeApi::new());
        let observed = Arc::new(Mutex::new(None));

        let inner = Arc::downgrade(&store);
        let slot = observed.clone();
        store.subscribe(Slice::Goals, move |_| {
            if let Some(store) = inner.upgrade() {
                *slot.lock().unwrap() = store.goals();
            }
        });

        store.set_goals(Goals::default());
        assert_eq!(*observed.lock().unwrap(), Some(Goals::default()));
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_others() {
        let (_, store) = store_with(FakeApi::new());
        let calls = Arc::new(AtomicUsize::new(0));

        store.subscribe(Slice::Foods, |_| panic!("boom"));
        let counter = calls.clone();
        store.subscribe(Slice::Foods, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set_foods(vec![Food::new(1, "Havregryn")]);
        store.set_foods(vec![]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.foods().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let (_, store) = store_with(FakeApi::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let id = store.subscribe(Slice::Weights, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.subscriber_count(Slice::Weights), 1);

        assert!(store.unsubscribe(Slice::Weights, id));
        assert!(!store.unsubscribe(Slice::Weights, id));
        // wrong slice is a no-op
        assert!(!store.unsubscribe(Slice::Goals, id));

        store.set_weights(vec![]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.subscriber_count(Slice::Weights), 0);
    }

    #[test]
    fn test_guarded_subscription() {
        let (_, store) = store_with(FakeApi::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let mut sub = store.subscribe_guarded(Slice::Diary, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.set_diary(DiaryDay::default());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sub.cleanup();
        assert!(!sub.is_active());
        store.set_diary(DiaryDay::default());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let counter = calls.clone();
        {
            let _sub = store.subscribe_guarded(Slice::Diary, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(store.subscriber_count(Slice::Diary), 1);
        }
        assert_eq!(store.subscriber_count(Slice::Diary), 0);
    }

    #[tokio::test]
    async fn test_load_all() {
        let api = FakeApi::new()
            .with_foods(vec![Food::new(1, "Rugbrød")])
            .with_diary(date(), vec![entry(1, 250.0), entry(2, 400.0)])
            .with_exercises(date(), vec![ExerciseEntry::new(5, "Cykling", 45.0, 350.0)])
            .with_goals(Goals::default());
        let (_, store) = store_with(api);

        let outcome = store.load_all(date()).await;
        assert!(outcome.all_applied());

        let state = store.state();
        assert_eq!(state.diary.date, Some(date()));
        assert_eq!(state.diary.entries.len(), 2);
        assert_eq!(state.foods.len(), 1);
        assert_eq!(state.goals, Some(Goals::default()));

        let summary = store.daily_summary();
        assert_eq!(summary.food_calories, 650.0);
        assert_eq!(summary.remaining_calories, 2000.0 - 650.0 + 350.0);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_slice() {
        let (api, store) = store_with(FakeApi::new().with_goals(Goals::default()));
        store.set_diary(DiaryDay::new(date(), vec![entry(1, 100.0)]));
        assert_eq!(store.load_goals().await, LoadOutcome::Applied);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        store.subscribe(Slice::Diary, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        api.fail_reads(Some(ApiError::Http("connection refused".to_string())));
        assert_eq!(store.load_diary(date()).await, LoadOutcome::Failed);
        assert_eq!(store.load_goals().await, LoadOutcome::Failed);

        assert_eq!(store.diary().entries, vec![entry(1, 100.0)]);
        assert_eq!(store.goals(), Some(Goals::default()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_goals_stay_absent() {
        let (_, store) = store_with(FakeApi::new());
        assert_eq!(store.load_goals().await, LoadOutcome::Missing);
        assert!(store.goals().is_none());
        assert_eq!(store.daily_summary().goal_calories, 2000.0);
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let earlier = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        let api = FakeApi::new()
            .with_diary(earlier, vec![entry(1, 100.0)])
            .with_diary(date(), vec![entry(2, 200.0), entry(3, 300.0)]);
        let (api, store) = store_with(api);

        let release = api.gate_next_diary_read();
        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.load_diary(earlier).await }
        });
        // let the slow load take its sequence number and park on the gate
        tokio::task::yield_now().await;

        assert_eq!(store.load_diary(date()).await, LoadOutcome::Applied);

        release.send(()).unwrap();
        assert_eq!(slow.await.unwrap(), LoadOutcome::Stale);

        let diary = store.diary();
        assert_eq!(diary.date, Some(date()));
        assert_eq!(diary.entries.len(), 2);
    }
}
