use serde::{Deserialize, Serialize};

use crate::models::{DiaryDay, ExerciseEntry, Food, Goals, WeightEntry};

/// Full application state held by the [`Store`](super::Store).
///
/// Consumers only ever see clones; mutation goes through the store setters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSnapshot {
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub diary: DiaryDay,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    pub weights: Vec<WeightEntry>,
    #[serde(default)]
    pub goals: Option<Goals>,
}

/// Calorie balance for the loaded diary date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySummary {
    pub goal_calories: f64,
    pub food_calories: f64,
    pub exercise_calories: f64,
    pub remaining_calories: f64,
}

/// Goal calories used when no goals have been loaded.
pub const FALLBACK_GOAL_CALORIES: f64 = 2000.0;

impl AppSnapshot {
    /// Sum of the stored calories of the loaded diary entries.
    pub fn food_calories(&self) -> f64 {
        self.diary.entries.iter().map(|e| e.calories).sum()
    }

    pub fn exercise_calories(&self) -> f64 {
        self.exercises.iter().map(|e| e.calories_burned).sum()
    }

    pub fn daily_summary(&self) -> DailySummary {
        let goal_calories = self
            .goals
            .map(|g| g.daily_calories)
            .unwrap_or(FALLBACK_GOAL_CALORIES);
        let food_calories = self.food_calories();
        let exercise_calories = self.exercise_calories();
        DailySummary {
            goal_calories,
            food_calories,
            exercise_calories,
            remaining_calories: goal_calories - food_calories + exercise_calories,
        }
    }
}
