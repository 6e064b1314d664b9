use serde::{Deserialize, Serialize};
use std::fmt;

use crate::macro_calories::{calories_from_macros, Macros};

/// Daily nutrition goals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Goals {
    pub daily_calories: f64,
    pub protein_target: f64,
    pub carbs_target: f64,
    pub fat_target: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily_calories: 2000.0,
            protein_target: 150.0,
            carbs_target: 250.0,
            fat_target: 70.0,
        }
    }
}

impl Goals {
    pub fn new(daily_calories: f64, protein_target: f64, carbs_target: f64, fat_target: f64) -> Self {
        Self {
            daily_calories,
            protein_target,
            carbs_target,
            fat_target,
        }
    }

    pub fn macros(&self) -> Macros {
        Macros::new(self.protein_target, self.carbs_target, self.fat_target)
    }

    /// Calories implied by the macro targets.
    pub fn macro_calories(&self) -> f64 {
        calories_from_macros(self.protein_target, self.carbs_target, self.fat_target)
    }

    /// Whether `daily_calories` agrees with the macro targets within `tolerance` kcal.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        (self.daily_calories - self.macro_calories()).abs() <= tolerance
    }
}

impl fmt::Display for Goals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal (protein {} g, carbs {} g, fat {} g)",
            self.daily_calories, self.protein_target, self.carbs_target, self.fat_target
        )
    }
}
