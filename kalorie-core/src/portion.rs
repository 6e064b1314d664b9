//! Portion units (1.0 = 100 g) and nutrition previews for a portion.

use serde::Serialize;

use crate::models::Food;

const GRAMS_PER_PORTION: f64 = 100.0;

pub fn portion_to_grams(portion: f64) -> f64 {
    let portion = if portion > 0.0 { portion } else { 1.0 };
    portion * GRAMS_PER_PORTION
}

pub fn grams_to_portion(grams: f64) -> f64 {
    let grams = if grams > 0.0 { grams } else { GRAMS_PER_PORTION };
    grams / GRAMS_PER_PORTION
}

/// Formats a portion as grams with one decimal, e.g. `150.0 gram`.
pub fn format_portion(portion: f64, show_unit: bool) -> String {
    let grams = portion_to_grams(portion);
    if show_unit {
        format!("{:.1} gram", grams)
    } else {
        format!("{:.1}", grams)
    }
}

/// Nutrition for an amount of a food.
///
/// Only used to preview an entry before it is committed; diary totals use the
/// calories the backend stored on each entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionPreview {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
}

pub fn nutrition_for_portion(food: &Food, portion: f64) -> NutritionPreview {
    let multiplier = if portion > 0.0 { portion } else { 1.0 };
    NutritionPreview {
        calories: food.calories * multiplier,
        protein: food.protein * multiplier,
        carbohydrates: food.carbohydrates * multiplier,
        fat: food.fat * multiplier,
        fiber: food.micros.fiber.unwrap_or(0.0) * multiplier,
        sugar: food.micros.sugar.unwrap_or(0.0) * multiplier,
    }
}

pub fn nutrition_for_grams(food: &Food, grams: f64) -> NutritionPreview {
    nutrition_for_portion(food, grams_to_portion(grams))
}
