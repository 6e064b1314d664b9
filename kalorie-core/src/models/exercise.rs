use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default)]
    pub calories_burned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ExerciseEntry {
    pub fn new(id: i64, name: impl Into<String>, duration_minutes: f64, calories_burned: f64) -> Self {
        Self {
            id,
            name: name.into(),
            duration_minutes,
            calories_burned,
            date: None,
        }
    }
}

impl fmt::Display for ExerciseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} min, {} kcal)",
            self.name,
            self.duration_minutes,
            self.calories_burned.round()
        )
    }
}

/// Payload for creating or editing an exercise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExerciseInput {
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub date: NaiveDate,
}
