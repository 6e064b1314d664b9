//! In-memory [`CalorieApi`] used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::oneshot;

use super::{ApiError, CalorieApi};
use crate::models::{
    DiaryEntry, DiaryEntryUpdate, EntryId, ExerciseEntry, ExerciseInput, Food, Goals,
    NewDiaryEntry, WeightEntry, WeightInput,
};

#[derive(Default)]
struct FakeData {
    foods: Vec<Food>,
    diary: HashMap<NaiveDate, Vec<DiaryEntry>>,
    exercises: HashMap<NaiveDate, Vec<ExerciseEntry>>,
    weights: Vec<WeightEntry>,
    goals: Option<Goals>,
    next_id: i64,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    data: Mutex<FakeData>,
    fail_reads: Mutex<Option<ApiError>>,
    delete_error: Mutex<Option<ApiError>>,
    set_goals_error: Mutex<Option<ApiError>>,
    diary_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    deleted: Mutex<Vec<EntryId>>,
    goals_writes: Mutex<Vec<Goals>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        let api = Self::default();
        api.data.lock().unwrap().next_id = 1000;
        api
    }

    pub(crate) fn with_foods(self, foods: Vec<Food>) -> Self {
        self.data.lock().unwrap().foods = foods;
        self
    }

    pub(crate) fn with_diary(self, date: NaiveDate, entries: Vec<DiaryEntry>) -> Self {
        self.data.lock().unwrap().diary.insert(date, entries);
        self
    }

    pub(crate) fn with_exercises(self, date: NaiveDate, exercises: Vec<ExerciseEntry>) -> Self {
        self.data.lock().unwrap().exercises.insert(date, exercises);
        self
    }

    pub(crate) fn with_goals(self, goals: Goals) -> Self {
        self.data.lock().unwrap().goals = Some(goals);
        self
    }

    /// Replaces the backend's entries for `date` behind the client's back.
    pub(crate) fn replace_diary(&self, date: NaiveDate, entries: Vec<DiaryEntry>) {
        self.data.lock().unwrap().diary.insert(date, entries);
    }

    pub(crate) fn fail_reads(&self, error: Option<ApiError>) {
        *self.fail_reads.lock().unwrap() = error;
    }

    pub(crate) fn fail_next_delete(&self, error: ApiError) {
        *self.delete_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_next_set_goals(&self, error: ApiError) {
        *self.set_goals_error.lock().unwrap() = Some(error);
    }

    /// Holds the next `get_diary_entries` call until the returned sender fires.
    pub(crate) fn gate_next_diary_read(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.diary_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub(crate) fn deleted(&self) -> Vec<EntryId> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn goals_writes(&self) -> Vec<Goals> {
        self.goals_writes.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), ApiError> {
        match self.fail_reads.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        let mut data = self.data.lock().unwrap();
        data.next_id += 1;
        data.next_id
    }
}

#[async_trait]
impl CalorieApi for FakeApi {
    async fn get_foods(&self) -> Result<Vec<Food>, ApiError> {
        self.check_read()?;
        Ok(self.data.lock().unwrap().foods.clone())
    }

    async fn get_food_by_id(&self, id: i64) -> Result<Food, ApiError> {
        self.check_read()?;
        self.data
            .lock()
            .unwrap()
            .foods
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/foods/{}/", id)))
    }

    async fn create_food(&self, food: &Food) -> Result<Food, ApiError> {
        let mut created = food.clone();
        created.id = self.next_id();
        self.data.lock().unwrap().foods.push(created.clone());
        Ok(created)
    }

    async fn update_food(&self, id: i64, food: &Food) -> Result<Food, ApiError> {
        let mut data = self.data.lock().unwrap();
        let slot = data
            .foods
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/foods/{}/", id)))?;
        *slot = food.clone();
        slot.id = id;
        Ok(slot.clone())
    }

    async fn get_diary_entries(&self, date: NaiveDate) -> Result<Vec<DiaryEntry>, ApiError> {
        let gate = self.diary_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.check_read()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .diary
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_diary_entry(&self, entry: &NewDiaryEntry) -> Result<DiaryEntry, ApiError> {
        let id = self.next_id();
        let mut data = self.data.lock().unwrap();
        let kcal_per_100g = data
            .foods
            .iter()
            .find(|f| f.id == entry.food_id)
            .map(|f| f.calories)
            .ok_or_else(|| ApiError::NotFound(format!("/foods/{}/", entry.food_id)))?;
        let created = DiaryEntry::new(id, entry.food_id, entry.amount_grams, entry.meal_type)
            .with_calories(kcal_per_100g * entry.amount_grams / 100.0);
        data.diary
            .entry(entry.date)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_diary_entry(
        &self,
        id: EntryId,
        update: &DiaryEntryUpdate,
    ) -> Result<DiaryEntry, ApiError> {
        let mut data = self.data.lock().unwrap();
        let entry = data
            .diary
            .values_mut()
            .flat_map(|entries| entries.iter_mut())
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/diary/entries/{}", id)))?;
        if let Some(grams) = update.amount_grams {
            let per_gram = if entry.amount_grams > 0.0 {
                entry.calories / entry.amount_grams
            } else {
                0.0
            };
            entry.amount_grams = grams;
            entry.calories = per_gram * grams;
        }
        if let Some(meal_type) = update.meal_type {
            entry.meal_type = meal_type;
        }
        Ok(entry.clone())
    }

    async fn delete_diary_entry(&self, id: EntryId) -> Result<(), ApiError> {
        if let Some(e) = self.delete_error.lock().unwrap().take() {
            return Err(e);
        }
        let mut data = self.data.lock().unwrap();
        let mut found = false;
        for entries in data.diary.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            found |= entries.len() != before;
        }
        if !found {
            return Err(ApiError::NotFound(format!("/diary/entries/{}", id)));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn get_exercises(&self, date: NaiveDate) -> Result<Vec<ExerciseEntry>, ApiError> {
        self.check_read()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .exercises
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_exercise(&self, exercise: &ExerciseInput) -> Result<ExerciseEntry, ApiError> {
        let mut created = ExerciseEntry::new(
            self.next_id(),
            exercise.name.clone(),
            exercise.duration_minutes,
            exercise.calories_burned,
        );
        created.date = Some(exercise.date);
        self.data
            .lock()
            .unwrap()
            .exercises
            .entry(exercise.date)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_exercise(
        &self,
        id: i64,
        exercise: &ExerciseInput,
    ) -> Result<ExerciseEntry, ApiError> {
        let mut updated = ExerciseEntry::new(
            id,
            exercise.name.clone(),
            exercise.duration_minutes,
            exercise.calories_burned,
        );
        updated.date = Some(exercise.date);
        Ok(updated)
    }

    async fn delete_exercise(&self, id: i64) -> Result<(), ApiError> {
        let mut data = self.data.lock().unwrap();
        for exercises in data.exercises.values_mut() {
            exercises.retain(|e| e.id != id);
        }
        Ok(())
    }

    async fn get_weights(&self) -> Result<Vec<WeightEntry>, ApiError> {
        self.check_read()?;
        Ok(self.data.lock().unwrap().weights.clone())
    }

    async fn add_weight_entry(&self, weight: &WeightInput) -> Result<WeightEntry, ApiError> {
        let created = WeightEntry {
            id: self.next_id(),
            date: weight.date,
            weight_kg: weight.weight_kg,
        };
        self.data.lock().unwrap().weights.push(created.clone());
        Ok(created)
    }

    async fn update_weight_entry(
        &self,
        id: i64,
        weight: &WeightInput,
    ) -> Result<WeightEntry, ApiError> {
        Ok(WeightEntry {
            id,
            date: weight.date,
            weight_kg: weight.weight_kg,
        })
    }

    async fn delete_weight_entry(&self, id: i64) -> Result<(), ApiError> {
        self.data.lock().unwrap().weights.retain(|w| w.id != id);
        Ok(())
    }

    async fn get_goals(&self) -> Result<Goals, ApiError> {
        self.check_read()?;
        self.data
            .lock()
            .unwrap()
            .goals
            .ok_or_else(|| ApiError::NotFound("/goals/".to_string()))
    }

    async fn set_goals(&self, goals: &Goals) -> Result<Goals, ApiError> {
        if let Some(e) = self.set_goals_error.lock().unwrap().take() {
            return Err(e);
        }
        self.goals_writes.lock().unwrap().push(*goals);
        self.data.lock().unwrap().goals = Some(*goals);
        Ok(*goals)
    }
}
