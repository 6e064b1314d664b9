use serde::{Deserialize, Serialize};
use std::fmt;

/// A food with nutrition values per 100 g.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(flatten)]
    pub micros: Micronutrients,
    /// Unix timestamp of the last time the food was added to the diary
    #[serde(default)]
    pub last_used: Option<i64>,
    /// Last chosen portion (1.0 = 100 g)
    #[serde(default = "default_portion")]
    pub last_portion: f64,
    #[serde(default)]
    pub used: u32,
}

fn default_portion() -> f64 {
    1.0
}

/// Optional micronutrients per 100 g.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Micronutrients {
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub unsaturated_fat: Option<f64>,
    pub cholesterol: Option<f64>,
    pub sodium: Option<f64>,
    pub potassium: Option<f64>,
    pub calcium: Option<f64>,
    pub iron: Option<f64>,
    pub vitamin_a: Option<f64>,
    pub vitamin_c: Option<f64>,
    pub vitamin_d: Option<f64>,
    pub vitamin_b12: Option<f64>,
    pub magnesium: Option<f64>,
}

impl Food {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            brand: None,
            category: String::new(),
            calories: 0.0,
            protein: 0.0,
            carbohydrates: 0.0,
            fat: 0.0,
            micros: Micronutrients::default(),
            last_used: None,
            last_portion: default_portion(),
            used: 0,
        }
    }

    pub fn with_macros(mut self, calories: f64, protein: f64, carbohydrates: f64, fat: f64) -> Self {
        self.calories = calories;
        self.protein = protein;
        self.carbohydrates = carbohydrates;
        self.fat = fat;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl fmt::Display for Food {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.brand {
            Some(brand) => write!(f, "{} ({})", self.name, brand)?,
            None => write!(f, "{}", self.name)?,
        }
        write!(f, " - {} kcal/100 g", self.calories)
    }
}
