use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal slot a diary entry belongs to.
///
/// The wire values are the Danish identifiers the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealType {
    #[serde(rename = "morgenmad")]
    Breakfast,
    #[serde(rename = "frokost")]
    Lunch,
    #[serde(rename = "aftensmad")]
    Dinner,
    #[serde(rename = "mellemmaaltid1", alias = "snack")]
    Snack1,
    #[serde(rename = "mellemmaaltid2")]
    Snack2,
}

impl Default for MealType {
    fn default() -> Self {
        MealType::Breakfast
    }
}

impl MealType {
    /// All meal types in diary display order.
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack1,
        MealType::Snack2,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            MealType::Breakfast => "morgenmad",
            MealType::Lunch => "frokost",
            MealType::Dinner => "aftensmad",
            MealType::Snack1 => "mellemmaaltid1",
            MealType::Snack2 => "mellemmaaltid2",
        }
    }

    /// Label shown in the diary.
    pub fn display_name(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Morgenmad",
            MealType::Lunch => "Frokost",
            MealType::Dinner => "Aftensmad",
            MealType::Snack1 => "Mellemmåltid 1",
            MealType::Snack2 => "Mellemmåltid 2",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morgenmad" | "breakfast" => Ok(MealType::Breakfast),
            "frokost" | "lunch" => Ok(MealType::Lunch),
            "aftensmad" | "dinner" => Ok(MealType::Dinner),
            "mellemmaaltid1" | "snack" | "snack1" => Ok(MealType::Snack1),
            "mellemmaaltid2" | "snack2" => Ok(MealType::Snack2),
            _ => Err(format!(
                "Invalid meal type '{}'. Valid options: morgenmad, frokost, aftensmad, mellemmaaltid1, mellemmaaltid2",
                s
            )),
        }
    }
}
