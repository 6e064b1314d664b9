//! Kalorie Core Library
//!
//! Client-side state for the Kalorie calorie tracker: models, the backend
//! client, the reactive store, macro/calorie math, goal editing and diary
//! reconciliation.

pub mod api;
pub mod debounce;
pub mod diary;
pub mod events;
pub mod goals;
pub mod macro_calories;
pub mod models;
pub mod portion;
pub mod store;

pub use api::{ApiError, CalorieApi, HttpApiClient, DEFAULT_API_URL};
pub use debounce::Debouncer;
pub use diary::{
    reconcile, DiaryController, DiaryError, DiarySurface, DiaryView, InMemorySurface,
    ReconcileReport, SwipeRecognizer,
};
pub use events::{AppEvent, EventBus};
pub use goals::{GoalEdits, GoalField, GoalsController, GoalsError, InteractionState};
pub use macro_calories::{
    calories_from_macros, macros_from_calories, MacroSplit, MacroSplitError, Macros,
};
pub use models::{
    DiaryDay, DiaryEntry, DiaryEntryUpdate, EntryId, ExerciseEntry, ExerciseInput, Food, Goals,
    MealType, NewDiaryEntry, WeightEntry, WeightInput,
};
pub use store::{AppSnapshot, FormattedGoals, LoadOutcome, Slice, Store, Subscription};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
