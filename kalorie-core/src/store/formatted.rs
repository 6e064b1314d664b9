//! Display-ready goal values.

use serde::Serialize;

use crate::macro_calories::macro_percentages;
use crate::models::Goals;

/// A numeric value paired with its display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedValue {
    pub value: f64,
    pub formatted: String,
}

impl FormattedValue {
    fn new(value: f64, suffix: &str) -> Self {
        Self {
            value,
            formatted: format!("{}{}", format_number(value), suffix),
        }
    }
}

/// A macro target with its share of the daily calories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedMacro {
    pub grams: FormattedValue,
    /// Rounded percentage of `daily_calories` supplied by this macro
    pub percentage: i64,
    pub percentage_formatted: String,
}

impl FormattedMacro {
    fn new(grams: f64, percentage: f64) -> Self {
        let percentage = percentage.round() as i64;
        Self {
            grams: FormattedValue::new(grams, "g"),
            percentage,
            percentage_formatted: format!("{}%", percentage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedGoals {
    pub daily_calories: FormattedValue,
    pub protein: FormattedMacro,
    pub carbs: FormattedMacro,
    pub fat: FormattedMacro,
}

impl FormattedGoals {
    pub fn from_goals(goals: &Goals) -> Self {
        let percentages = macro_percentages(goals.macros(), goals.daily_calories);
        Self {
            daily_calories: FormattedValue::new(goals.daily_calories, ""),
            protein: FormattedMacro::new(goals.protein_target, percentages.protein),
            carbs: FormattedMacro::new(goals.carbs_target, percentages.carbs),
            fat: FormattedMacro::new(goals.fat_target, percentages.fat),
        }
    }
}

/// Formats a number for display.
///
/// Whole numbers get `.` thousands separators (`2.000`); anything else is
/// shown with one decimal.
pub fn format_number(value: f64) -> String {
    if value.fract() != 0.0 || !value.is_finite() {
        return format!("{:.1}", value);
    }

    let digits = format!("{}", value.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if value < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
