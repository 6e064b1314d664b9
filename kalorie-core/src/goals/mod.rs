//! Goal editing.

mod controller;
mod field;
mod interaction;

pub use controller::{GoalEdits, GoalsController, GoalsError};
pub use field::{GoalField, KnobRange};
pub use interaction::InteractionState;
