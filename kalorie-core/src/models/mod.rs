mod diary_entry;
mod exercise;
mod food;
mod goals;
mod lenient;
mod meal_type;
mod weight;

pub use diary_entry::{DiaryDay, DiaryEntry, DiaryEntryUpdate, EntryId, NewDiaryEntry};
pub use exercise::{ExerciseEntry, ExerciseInput};
pub use food::{Food, Micronutrients};
pub use goals::Goals;
pub use meal_type::MealType;
pub use weight::{WeightEntry, WeightInput};
