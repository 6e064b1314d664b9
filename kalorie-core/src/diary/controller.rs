//! Diary mutations and resynchronisation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::broadcast;

use super::reconcile::{reconcile, ReconcileReport};
use super::surface::{DiarySurface, EntryVisual};
use crate::api::ApiError;
use crate::events::AppEvent;
use crate::models::{DiaryDay, DiaryEntry, DiaryEntryUpdate, EntryId, NewDiaryEntry};
use crate::store::{LoadOutcome, Store};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DiaryError {
    #[error("failed to delete diary entry {id}: {source}")]
    Delete { id: EntryId, source: ApiError },
    #[error("failed to save diary entry: {0}")]
    Mutation(ApiError),
    #[error("failed to fetch diary: {0}")]
    Fetch(ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The backend deleted the entry, or it was already gone
    Deleted,
    /// The entry was not in the store; only its element was removed
    Detached,
}

/// Result of [`DiaryController::resync`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resync {
    pub outcome: LoadOutcome,
    pub report: ReconcileReport,
}

/// Applies diary mutations to the backend, the store and a surface.
///
/// The surface lock is never held while the store is updated, so a mounted
/// [`DiaryView`](super::DiaryView) sharing the surface can reconcile from
/// its subscription.
pub struct DiaryController<S: DiarySurface> {
    store: Arc<Store>,
    surface: Arc<Mutex<S>>,
}

impl<S: DiarySurface> DiaryController<S> {
    pub fn new(store: Arc<Store>, surface: Arc<Mutex<S>>) -> Self {
        Self { store, surface }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.surface
    }

    /// The loaded diary date, or today if none is loaded.
    pub fn current_date(&self) -> NaiveDate {
        self.store
            .diary()
            .date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Reconciles the surface with the entries currently in the store.
    pub fn reconcile_now(&self) -> ReconcileReport {
        let entries = self.store.diary().entries;
        reconcile(&mut *self.lock_surface(), &entries)
    }

    /// Reloads the diary for `date` and reconciles.
    pub async fn resync(&self, date: NaiveDate) -> Resync {
        let outcome = self.store.load_diary(date).await;
        let report = self.reconcile_now();
        let entries: usize = report.groups.iter().map(|g| g.entries.len()).sum();
        tracing::debug!(%date, %outcome, entries, "diary resynced");
        Resync { outcome, report }
    }

    /// Fetches the backend's entries for `date` and, when their ids differ
    /// from the store's, replaces the diary with them.
    ///
    /// Returns whether anything changed.
    pub async fn check_and_sync(&self, date: NaiveDate) -> Result<bool, DiaryError> {
        let fetched = self
            .store
            .api()
            .get_diary_entries(date)
            .await
            .map_err(DiaryError::Fetch)?;

        let current = self.store.diary();
        let fetched_ids: HashSet<EntryId> = fetched.iter().map(|e| e.id).collect();
        let current_ids: HashSet<EntryId> = current.entries.iter().map(|e| e.id).collect();
        if current.date == Some(date) && fetched_ids == current_ids {
            return Ok(false);
        }

        tracing::info!(
            %date,
            local = current_ids.len(),
            remote = fetched_ids.len(),
            "diary out of sync, replacing"
        );
        self.store.set_diary(DiaryDay::new(date, fetched));
        self.reconcile_now();
        Ok(true)
    }

    /// Optimistically deletes an entry.
    ///
    /// The element is dismissed and the entry dropped from the store before
    /// the backend call. If the backend fails (other than with not-found) the
    /// entry is put back at its original position and the element restored.
    ///
    /// The store update is not sequenced against loads: a `load_diary` that
    /// was already in flight can still apply and bring the entry back until
    /// the next resync.
    pub async fn delete_entry(&self, id: EntryId) -> Result<DeleteOutcome, DiaryError> {
        let mut day = self.store.diary();
        let Some(index) = day.entries.iter().position(|e| e.id == id) else {
            tracing::debug!(id, "entry not in store, detaching element only");
            self.lock_surface().detach_entry(id);
            return Ok(DeleteOutcome::Detached);
        };

        self.lock_surface()
            .set_entry_visual(id, EntryVisual::DISMISSED);
        let removed = day.entries.remove(index);
        let date = day.date;
        self.store.set_diary(day);

        match self.store.api().delete_diary_entry(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(id, "entry already deleted on server");
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "delete failed, restoring entry");
                self.restore(date, index, removed);
                let mut surface = self.lock_surface();
                surface.set_entry_visual(id, EntryVisual::RESTING);
                return Err(DiaryError::Delete { id, source: e });
            }
        }

        self.lock_surface().detach_entry(id);
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn add_entry(&self, entry: NewDiaryEntry) -> Result<DiaryEntry, DiaryError> {
        let created = self
            .store
            .api()
            .add_diary_entry(&entry)
            .await
            .map_err(DiaryError::Mutation)?;
        self.resync(entry.date).await;
        Ok(created)
    }

    pub async fn update_entry(
        &self,
        id: EntryId,
        update: DiaryEntryUpdate,
    ) -> Result<DiaryEntry, DiaryError> {
        let updated = self
            .store
            .api()
            .update_diary_entry(id, &update)
            .await
            .map_err(DiaryError::Mutation)?;
        let date = self.current_date();
        self.resync(date).await;
        Ok(updated)
    }

    /// Reacts to an application event.
    pub async fn handle_event(&self, event: &AppEvent) -> Result<(), DiaryError> {
        match event {
            AppEvent::DeleteEntry { entry_id } => {
                self.delete_entry(*entry_id).await?;
            }
            AppEvent::AcceptFood {
                food,
                amount_grams,
                meal_type,
            } => {
                let entry = NewDiaryEntry {
                    food_id: food.id,
                    amount_grams: *amount_grams,
                    meal_type: *meal_type,
                    date: self.current_date(),
                };
                self.add_entry(entry).await?;
            }
            AppEvent::GoalsCommitted => {
                self.store.load_goals().await;
                let date = self.current_date();
                self.resync(date).await;
            }
            _ => {}
        }
        Ok(())
    }

    /// Handles events until the bus closes.
    ///
    /// Failures are logged and do not stop the loop. If events were missed
    /// the diary is resynced.
    pub async fn run(&self, mut events: broadcast::Receiver<AppEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle_event(&event).await {
                        tracing::warn!(event = event.name(), error = %e, "diary event failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "diary controller lagged behind events");
                    let date = self.current_date();
                    self.resync(date).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn restore(&self, date: Option<NaiveDate>, index: usize, entry: DiaryEntry) {
        let mut day = self.store.diary();
        if day.date != date {
            tracing::debug!(id = entry.id, "diary date changed, not restoring entry");
            return;
        }
        if !day.contains(entry.id) {
            let index = index.min(day.entries.len());
            day.entries.insert(index, entry);
        }
        self.store.set_diary(day);
        self.reconcile_now();
    }

    fn lock_surface(&self) -> MutexGuard<'_, S> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::api::CalorieApi;
    use crate::diary::surface::{InMemorySurface, LISTENERS_PER_ENTRY};
    use crate::diary::{DiaryView, SwipeOutcome, SwipeRecognizer};
    use crate::events::EventBus;
    use std::time::Duration;
    use crate::models::{Food, Goals, MealType};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn entry(id: EntryId, meal: MealType, kcal: f64) -> DiaryEntry {
        DiaryEntry::new(id, 1, 100.0, meal).with_calories(kcal)
    }

    fn entries() -> Vec<DiaryEntry> {
        vec![
            entry(1, MealType::Breakfast, 300.0),
            entry(2, MealType::Lunch, 450.0),
            entry(3, MealType::Lunch, 150.0),
        ]
    }

    async fn setup(api: FakeApi) -> (Arc<FakeApi>, DiaryController<InMemorySurface>) {
        let api = Arc::new(api);
        let store = Arc::new(Store::new(api.clone()));
        let surface = Arc::new(Mutex::new(InMemorySurface::new()));
        let ctrl = DiaryController::new(store, surface);
        ctrl.resync(date()).await;
        (api, ctrl)
    }

    fn ids(ctrl: &DiaryController<InMemorySurface>) -> Vec<EntryId> {
        ctrl.surface().lock().unwrap().rendered_entry_ids()
    }

    #[tokio::test]
    async fn test_resync_renders_groups() {
        let (_, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;

        assert_eq!(ids(&ctrl), vec![1, 2, 3]);
        let surface = ctrl.surface().lock().unwrap();
        assert_eq!(surface.subtotal(MealType::Lunch), 600.0);
        assert_eq!(surface.subtotal(MealType::Dinner), 0.0);
    }

    #[tokio::test]
    async fn test_delete_success() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;

        let outcome = ctrl.delete_entry(2).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(api.deleted(), vec![2]);
        assert!(!ctrl.store().diary().contains(2));
        assert_eq!(ids(&ctrl), vec![1, 3]);

        // a later reconcile shows the same result
        ctrl.reconcile_now();
        assert_eq!(ids(&ctrl), vec![1, 3]);
        let surface = ctrl.surface().lock().unwrap();
        assert_eq!(surface.subtotal(MealType::Lunch), 150.0);
        assert_eq!(surface.global_listener_count(), 2 * LISTENERS_PER_ENTRY);
    }

    #[tokio::test]
    async fn test_delete_not_found_counts_as_success() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        api.fail_next_delete(ApiError::NotFound("/diary/entries/3".to_string()));

        assert_eq!(ctrl.delete_entry(3).await, Ok(DeleteOutcome::Deleted));
        assert!(!ctrl.store().diary().contains(3));
        assert_eq!(ids(&ctrl), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_delete_failure_rolls_back() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        let before = ctrl.store().diary();
        api.fail_next_delete(ApiError::Http("500".to_string()));

        let result = ctrl.delete_entry(2).await;

        assert!(matches!(result, Err(DiaryError::Delete { id: 2, .. })));
        assert_eq!(ctrl.store().diary(), before);
        assert_eq!(ids(&ctrl), vec![1, 2, 3]);
        let surface = ctrl.surface().lock().unwrap();
        assert_eq!(surface.visual(2), Some(EntryVisual::RESTING));
        assert_eq!(surface.subtotal(MealType::Lunch), 600.0);
    }

    #[tokio::test]
    async fn test_delete_failure_with_mounted_view() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        let _view = DiaryView::mount(ctrl.store(), ctrl.surface().clone());
        api.fail_next_delete(ApiError::Http("timeout".to_string()));

        assert!(ctrl.delete_entry(1).await.is_err());

        assert_eq!(ctrl.store().diary().entries[0].id, 1);
        assert_eq!(ids(&ctrl), vec![1, 2, 3]);
        let surface = ctrl.surface().lock().unwrap();
        assert_eq!(surface.visual(1), Some(EntryVisual::RESTING));
        assert_eq!(surface.global_listener_count(), 3 * LISTENERS_PER_ENTRY);
    }

    #[tokio::test]
    async fn test_delete_unknown_entry_only_detaches() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        ctrl.store().set_diary(DiaryDay::new(date(), vec![entry(1, MealType::Breakfast, 300.0)]));

        assert_eq!(ctrl.delete_entry(3).await, Ok(DeleteOutcome::Detached));
        assert!(api.deleted().is_empty());
        assert!(!ids(&ctrl).contains(&3));
    }

    #[tokio::test]
    async fn test_check_and_sync_replaces_diverged_diary() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        assert_eq!(ctrl.check_and_sync(date()).await, Ok(false));

        // another device removed entry 1 and added entry 7
        api.replace_diary(
            date(),
            vec![
                entry(2, MealType::Lunch, 450.0),
                entry(3, MealType::Lunch, 150.0),
                entry(7, MealType::Dinner, 800.0),
            ],
        );

        assert_eq!(ctrl.check_and_sync(date()).await, Ok(true));
        assert_eq!(ids(&ctrl), vec![2, 3, 7]);
        assert_eq!(ctrl.store().diary().entries.len(), 3);
        assert_eq!(ctrl.surface().lock().unwrap().subtotal(MealType::Dinner), 800.0);
    }

    #[tokio::test]
    async fn test_check_and_sync_fetch_failure() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        api.fail_reads(Some(ApiError::Http("offline".to_string())));

        let result = ctrl.check_and_sync(date()).await;
        assert!(matches!(result, Err(DiaryError::Fetch(_))));
        assert_eq!(ids(&ctrl), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_and_update_entry_resync() {
        let food = Food::new(40, "Skyr").with_macros(63.0, 11.0, 4.0, 0.2);
        let (_, ctrl) = setup(
            FakeApi::new()
                .with_foods(vec![food])
                .with_diary(date(), entries()),
        )
        .await;

        let created = ctrl
            .add_entry(NewDiaryEntry {
                food_id: 40,
                amount_grams: 200.0,
                meal_type: MealType::Snack1,
                date: date(),
            })
            .await
            .unwrap();
        assert_eq!(created.calories, 126.0);
        assert!(ids(&ctrl).contains(&created.id));
        assert_eq!(ctrl.surface().lock().unwrap().subtotal(MealType::Snack1), 126.0);

        ctrl.update_entry(
            created.id,
            DiaryEntryUpdate {
                amount_grams: None,
                meal_type: Some(MealType::Snack2),
            },
        )
        .await
        .unwrap();
        let surface = ctrl.surface().lock().unwrap();
        assert_eq!(surface.subtotal(MealType::Snack1), 0.0);
        assert_eq!(surface.subtotal(MealType::Snack2), 126.0);
    }

    #[tokio::test]
    async fn test_add_entry_failure() {
        let (_, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        let result = ctrl
            .add_entry(NewDiaryEntry {
                food_id: 999,
                amount_grams: 100.0,
                meal_type: MealType::Lunch,
                date: date(),
            })
            .await;
        assert!(matches!(result, Err(DiaryError::Mutation(ApiError::NotFound(_)))));
        assert_eq!(ids(&ctrl), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_goals_committed_reloads_goals_and_diary() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        api.set_goals(&Goals::new(1700.0, 120.0, 180.0, 55.0))
            .await
            .unwrap();
        api.replace_diary(date(), vec![entry(1, MealType::Breakfast, 300.0)]);

        ctrl.handle_event(&AppEvent::GoalsCommitted).await.unwrap();

        assert_eq!(ctrl.store().goals().map(|g| g.daily_calories), Some(1700.0));
        assert_eq!(ids(&ctrl), vec![1]);
    }

    #[tokio::test]
    async fn test_run_handles_bus_events() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        let bus = EventBus::default();
        let events = bus.subscribe();

        bus.publish(AppEvent::DeleteEntry { entry_id: 1 });
        bus.publish(AppEvent::DashboardNavigation);
        drop(bus);

        ctrl.run(events).await;
        assert_eq!(api.deleted(), vec![1]);
        assert_eq!(ids(&ctrl), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_swipe_left_deletes_through_bus() {
        let (api, ctrl) = setup(FakeApi::new().with_diary(date(), entries())).await;
        let bus = EventBus::default();
        let events = bus.subscribe();

        let start = std::time::Instant::now();
        let mut short = SwipeRecognizer::deleting(3, &bus);
        short.press(200.0, start);
        short.move_to(170.0);
        assert_eq!(
            short.release(start + Duration::from_millis(300)),
            SwipeOutcome::Cancelled
        );

        let mut swipe = SwipeRecognizer::deleting(2, &bus);
        swipe.press(200.0, start);
        assert_eq!(swipe.move_to(120.0), Some(-80.0));
        assert_eq!(
            swipe.release(start + Duration::from_millis(250)),
            SwipeOutcome::Triggered
        );
        drop((short, swipe, bus));

        ctrl.run(events).await;
        assert_eq!(api.deleted(), vec![2]);
        assert_eq!(ids(&ctrl), vec![1, 3]);
    }
}
