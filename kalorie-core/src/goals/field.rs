use std::fmt;
use std::str::FromStr;

use crate::models::Goals;

/// One of the four editable goal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalField {
    Calories,
    Protein,
    Carbs,
    Fat,
}

/// Allowed input range of a goal field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl KnobRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamps `value` into the range and snaps it to the nearest step.
    pub fn constrain(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let stepped = self.min + ((clamped - self.min) / self.step).round() * self.step;
        stepped.min(self.max)
    }
}

impl GoalField {
    pub const ALL: [GoalField; 4] = [
        GoalField::Calories,
        GoalField::Protein,
        GoalField::Carbs,
        GoalField::Fat,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GoalField::Calories => "Kalorier",
            GoalField::Protein => "Protein",
            GoalField::Carbs => "Kulhydrater",
            GoalField::Fat => "Fedt",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            GoalField::Calories => "kcal",
            _ => "g",
        }
    }

    pub fn range(&self) -> KnobRange {
        match self {
            GoalField::Calories => KnobRange::new(0.0, 3500.0, 1.0),
            GoalField::Protein => KnobRange::new(0.0, 350.0, 1.0),
            GoalField::Carbs => KnobRange::new(0.0, 350.0, 1.0),
            GoalField::Fat => KnobRange::new(0.0, 150.0, 1.0),
        }
    }

    pub fn is_macro(&self) -> bool {
        !matches!(self, GoalField::Calories)
    }

    pub fn get(&self, goals: &Goals) -> f64 {
        match self {
            GoalField::Calories => goals.daily_calories,
            GoalField::Protein => goals.protein_target,
            GoalField::Carbs => goals.carbs_target,
            GoalField::Fat => goals.fat_target,
        }
    }

    pub fn set(&self, goals: &mut Goals, value: f64) {
        match self {
            GoalField::Calories => goals.daily_calories = value,
            GoalField::Protein => goals.protein_target = value,
            GoalField::Carbs => goals.carbs_target = value,
            GoalField::Fat => goals.fat_target = value,
        }
    }
}

impl fmt::Display for GoalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GoalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calories" | "kalorier" => Ok(GoalField::Calories),
            "protein" => Ok(GoalField::Protein),
            "carbs" | "kulhydrater" => Ok(GoalField::Carbs),
            "fat" | "fedt" => Ok(GoalField::Fat),
            _ => Err(format!("Unknown goal field: {}", s)),
        }
    }
}
