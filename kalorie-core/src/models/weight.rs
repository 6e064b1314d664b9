use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub weight_kg: f64,
}

impl fmt::Display for WeightEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.1} kg", self.date, self.weight_kg)
    }
}

/// Payload for creating or editing a weight entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeightInput {
    pub date: NaiveDate,
    pub weight_kg: f64,
}
