use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::food::Food;
use super::lenient::lenient_vec;
use super::meal_type::MealType;
use crate::portion::portion_to_grams;

pub type EntryId = i64;

/// One logged food in the diary.
///
/// `calories` is computed by the backend when the entry is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntry {
    pub id: EntryId,
    pub food_id: i64,
    #[serde(alias = "grams")]
    pub amount_grams: f64,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default)]
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
}

impl DiaryEntry {
    pub fn new(id: EntryId, food_id: i64, amount_grams: f64, meal_type: MealType) -> Self {
        Self {
            id,
            food_id,
            amount_grams,
            meal_type,
            calories: 0.0,
            food_name: None,
        }
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories = calories;
        self
    }

    pub fn with_food_name(mut self, name: impl Into<String>) -> Self {
        self.food_name = Some(name.into());
        self
    }
}

impl fmt::Display for DiaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .food_name
            .clone()
            .unwrap_or_else(|| format!("food #{}", self.food_id));
        write!(
            f,
            "{} {} g, {} kcal",
            name,
            self.amount_grams,
            self.calories.round()
        )
    }
}

/// Diary entries for a single date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiaryDay {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub entries: Vec<DiaryEntry>,
}

impl DiaryDay {
    pub fn new(date: NaiveDate, entries: Vec<DiaryEntry>) -> Self {
        Self {
            date: Some(date),
            entries,
        }
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}

/// Payload for creating a diary entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewDiaryEntry {
    pub food_id: i64,
    pub amount_grams: f64,
    pub meal_type: MealType,
    pub date: NaiveDate,
}

impl NewDiaryEntry {
    /// An entry for `portion` of `food`, where 1.0 is 100 g.
    ///
    /// A non-positive portion counts as one portion.
    pub fn from_portion(food: &Food, portion: f64, meal_type: MealType, date: NaiveDate) -> Self {
        Self {
            food_id: food.id,
            amount_grams: portion_to_grams(portion),
            meal_type,
            date,
        }
    }
}

/// Payload for editing a diary entry. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DiaryEntryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_grams: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
}
