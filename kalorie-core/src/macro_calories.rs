//! Conversion between total calories and protein/carbs/fat grams.
//!
//! Nothing in here rounds. Callers round once, when a value is committed or
//! displayed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

const SPLIT_TOLERANCE: f64 = 1e-6;

/// Macro nutrient amounts in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
        }
    }

    pub fn calories(&self) -> f64 {
        calories_from_macros(self.protein, self.carbs, self.fat)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MacroSplitError {
    #[error("macro split fractions must be finite numbers")]
    NotFinite,
    #[error("macro split fractions must be non-negative")]
    Negative,
    #[error("macro split fractions must sum to 1.0, got {0}")]
    BadSum(f64),
}

/// Fractions of total calories assigned to each macro when there is no
/// existing baseline to preserve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl MacroSplit {
    /// 25 % protein, 50 % carbs, 25 % fat.
    pub const DEFAULT: MacroSplit = MacroSplit {
        protein: 0.25,
        carbs: 0.50,
        fat: 0.25,
    };

    /// 25 % protein, 45 % carbs, 30 % fat.
    pub const ALTERNATIVE: MacroSplit = MacroSplit {
        protein: 0.25,
        carbs: 0.45,
        fat: 0.30,
    };

    pub fn new(protein: f64, carbs: f64, fat: f64) -> Result<Self, MacroSplitError> {
        if ![protein, carbs, fat].iter().all(|f| f.is_finite()) {
            return Err(MacroSplitError::NotFinite);
        }
        if protein < 0.0 || carbs < 0.0 || fat < 0.0 {
            return Err(MacroSplitError::Negative);
        }
        let sum = protein + carbs + fat;
        if (sum - 1.0).abs() > SPLIT_TOLERANCE {
            return Err(MacroSplitError::BadSum(sum));
        }
        Ok(Self {
            protein,
            carbs,
            fat,
        })
    }

    pub fn protein(&self) -> f64 {
        self.protein
    }

    pub fn carbs(&self) -> f64 {
        self.carbs
    }

    pub fn fat(&self) -> f64 {
        self.fat
    }
}

impl Default for MacroSplit {
    fn default() -> Self {
        MacroSplit::DEFAULT
    }
}

pub fn calories_from_macros(protein: f64, carbs: f64, fat: f64) -> f64 {
    protein * KCAL_PER_GRAM_PROTEIN + carbs * KCAL_PER_GRAM_CARBS + fat * KCAL_PER_GRAM_FAT
}

/// Distributes `calories` over the three macros.
///
/// With a non-zero baseline each macro keeps its share of the baseline's
/// macro calories (not its share of grams). With an all-zero baseline the
/// calories are allocated by `default_split`.
pub fn macros_from_calories(calories: f64, current: Macros, default_split: MacroSplit) -> Macros {
    let calories = calories.max(0.0);

    let protein_kcal = current.protein.max(0.0) * KCAL_PER_GRAM_PROTEIN;
    let carbs_kcal = current.carbs.max(0.0) * KCAL_PER_GRAM_CARBS;
    let fat_kcal = current.fat.max(0.0) * KCAL_PER_GRAM_FAT;
    let total = protein_kcal + carbs_kcal + fat_kcal;

    let (protein_share, carbs_share, fat_share) = if total == 0.0 {
        (
            default_split.protein,
            default_split.carbs,
            default_split.fat,
        )
    } else {
        (protein_kcal / total, carbs_kcal / total, fat_kcal / total)
    };

    Macros {
        protein: calories * protein_share / KCAL_PER_GRAM_PROTEIN,
        carbs: calories * carbs_share / KCAL_PER_GRAM_CARBS,
        fat: calories * fat_share / KCAL_PER_GRAM_FAT,
    }
}

/// Share of `calories` contributed by each macro, in percent.
///
/// Returns zeros when `calories` is not positive.
pub fn macro_percentages(macros: Macros, calories: f64) -> Macros {
    if calories <= 0.0 {
        return Macros::default();
    }
    Macros {
        protein: macros.protein * KCAL_PER_GRAM_PROTEIN / calories * 100.0,
        carbs: macros.carbs * KCAL_PER_GRAM_CARBS / calories * 100.0,
        fat: macros.fat * KCAL_PER_GRAM_FAT / calories * 100.0,
    }
}
