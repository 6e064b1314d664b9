//! Interactive editing of the daily goals.

use std::sync::Arc;

use thiserror::Error;

use super::field::GoalField;
use super::interaction::InteractionState;
use crate::api::ApiError;
use crate::events::{AppEvent, EventBus};
use crate::macro_calories::{calories_from_macros, macros_from_calories, MacroSplit, Macros};
use crate::models::Goals;
use crate::store::{LoadOutcome, Store};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GoalsError {
    #[error("failed to save goals: {0}")]
    Commit(ApiError),
    #[error("no goal values given")]
    NoEdits,
    #[error("calories together with macros needs all three macros")]
    ConflictingEdits,
}

/// Explicit values for any of the four goal fields, applied together.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GoalEdits {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl GoalEdits {
    pub fn is_empty(&self) -> bool {
        *self == GoalEdits::default()
    }
}

/// Mediates edits of the four goal fields and commits them as one unit.
///
/// Editing a macro recomputes only the calories. Editing the calories
/// redistributes them over the macros, keeping each macro's share of the
/// macro calories seen when the interaction began. Nothing reaches the
/// backend until [`commit`](Self::commit).
pub struct GoalsController {
    store: Arc<Store>,
    bus: EventBus,
    default_split: MacroSplit,
    values: Goals,
    committed: Goals,
    state: InteractionState,
    baseline: Macros,
    dirty: bool,
    last_error: Option<GoalsError>,
}

impl GoalsController {
    /// Creates a controller showing the store's goals, or the defaults if
    /// none are loaded yet.
    pub fn new(store: Arc<Store>, bus: EventBus, default_split: MacroSplit) -> Self {
        let goals = store.goals().unwrap_or_default();
        Self {
            store,
            bus,
            default_split,
            values: goals,
            committed: goals,
            state: InteractionState::Idle,
            baseline: goals.macros(),
            dirty: false,
            last_error: None,
        }
    }

    pub fn values(&self) -> Goals {
        self.values
    }

    pub fn value(&self, field: GoalField) -> f64 {
        field.get(&self.values)
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_error(&self) -> Option<&GoalsError> {
        self.last_error.as_ref()
    }

    // --- user input ---

    pub fn begin_interaction(&mut self, field: GoalField) {
        if self.state == InteractionState::ProgrammaticUpdate {
            tracing::debug!(%field, "ignoring interaction during programmatic update");
            return;
        }
        self.state = InteractionState::UserEngaged(field);
        self.baseline = self.values.macros();
    }

    /// Live update while the user drags `field`.
    ///
    /// Starts an interaction with `field` if another field (or none) was
    /// engaged. Returns the values after recomputation.
    pub fn drag(&mut self, field: GoalField, value: f64) -> Goals {
        if self.state == InteractionState::ProgrammaticUpdate {
            return self.values;
        }
        if !self.state.is_engaged_with(field) {
            self.begin_interaction(field);
        }
        self.apply_user_value(field, value);
        self.values
    }

    /// Finishes the current interaction, recomputing from the final value.
    pub fn end_interaction(&mut self) -> Goals {
        if let InteractionState::UserEngaged(field) = self.state {
            let value = field.get(&self.values);
            self.apply_user_value(field, value);
            self.state = InteractionState::Idle;
        }
        self.values
    }

    /// A discrete edit: begin, one drag to `value`, end.
    pub fn edit(&mut self, field: GoalField, value: f64) -> Goals {
        self.begin_interaction(field);
        self.drag(field, value);
        self.end_interaction()
    }

    /// Change notification from an input bound to `field`.
    ///
    /// Returns false when the notification was ignored: during a
    /// programmatic update, or when it echoes a sibling of the engaged field.
    pub fn on_value_changed(&mut self, field: GoalField, value: f64) -> bool {
        if !self.state.accepts_user_change(field) {
            tracing::trace!(%field, state = %self.state, "ignoring change notification");
            return false;
        }
        match self.state {
            InteractionState::UserEngaged(_) => {
                self.drag(field, value);
            }
            _ => {
                self.edit(field, value);
            }
        }
        true
    }

    /// Runs `update` with user change handling suspended.
    ///
    /// Change notifications raised by `update` are ignored; the previous
    /// interaction state is restored afterwards.
    pub fn programmatic<R>(&mut self, update: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.state;
        self.state = InteractionState::ProgrammaticUpdate;
        let result = update(self);
        self.state = previous;
        result
    }

    /// Replaces every field without recomputation.
    pub fn set_values(&mut self, goals: Goals) {
        self.programmatic(|ctrl| {
            ctrl.values = goals;
            ctrl.baseline = goals.macros();
        });
        self.dirty = self.values != self.committed;
    }

    // --- lifecycle ---

    /// Discards uncommitted edits.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
        let committed = self.committed;
        self.set_values(committed);
        self.dirty = false;
    }

    /// Takes the goals currently in the store, discarding edits.
    pub fn reload(&mut self) {
        if let Some(goals) = self.store.goals() {
            self.committed = goals;
        }
        self.state = InteractionState::Idle;
        let committed = self.committed;
        self.set_values(committed);
        self.dirty = false;
    }

    /// Loads goals from the backend into the store.
    ///
    /// Only an applied load [`reload`](Self::reload)s; any other outcome
    /// leaves the values and the dirty flag alone.
    pub async fn refresh(&mut self) -> LoadOutcome {
        let outcome = self.store.load_goals().await;
        if outcome == LoadOutcome::Applied {
            self.reload();
        }
        outcome
    }

    /// Applies several explicit values as one edit.
    ///
    /// Calories alone redistribute over the macros and macros alone
    /// recompute the calories. Calories with all three macros are taken as
    /// given; calories with only some of the macros are rejected.
    pub fn apply_edits(&mut self, edits: GoalEdits) -> Result<Goals, GoalsError> {
        let macros = [
            (GoalField::Protein, edits.protein),
            (GoalField::Carbs, edits.carbs),
            (GoalField::Fat, edits.fat),
        ];
        let given = macros.iter().filter(|(_, v)| v.is_some()).count();

        match (edits.calories, edits.protein, edits.carbs, edits.fat) {
            (None, None, None, None) => return Err(GoalsError::NoEdits),
            (Some(calories), Some(protein), Some(carbs), Some(fat)) => {
                self.state = InteractionState::Idle;
                self.set_values(Goals::new(
                    GoalField::Calories.range().constrain(calories),
                    GoalField::Protein.range().constrain(protein),
                    GoalField::Carbs.range().constrain(carbs),
                    GoalField::Fat.range().constrain(fat),
                ));
            }
            (Some(_), ..) if given > 0 => return Err(GoalsError::ConflictingEdits),
            (Some(calories), ..) => {
                self.edit(GoalField::Calories, calories);
            }
            (None, ..) => {
                for (field, value) in macros {
                    if let Some(value) = value {
                        self.edit(field, value);
                    }
                }
            }
        }
        Ok(self.values)
    }

    /// Rounds the four values and writes them to the backend in one call.
    ///
    /// On success the store holds the saved goals and `GoalsCommitted` is
    /// published. On failure nothing changes except the recorded error.
    pub async fn commit(&mut self) -> Result<Goals, GoalsError> {
        self.end_interaction();

        let rounded = Goals::new(
            self.values.daily_calories.round(),
            self.values.protein_target.round(),
            self.values.carbs_target.round(),
            self.values.fat_target.round(),
        );

        let saved = match self.store.api().set_goals(&rounded).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "failed to commit goals");
                let error = GoalsError::Commit(e);
                self.last_error = Some(error.clone());
                return Err(error);
            }
        };

        tracing::info!(goals = %saved, "goals committed");
        self.store.set_goals(saved);
        self.committed = saved;
        self.set_values(saved);
        self.dirty = false;
        self.last_error = None;
        self.bus.publish(AppEvent::GoalsCommitted);
        Ok(saved)
    }

    fn apply_user_value(&mut self, field: GoalField, value: f64) {
        let value = field.range().constrain(value);
        field.set(&mut self.values, value);

        if field.is_macro() {
            self.values.daily_calories = calories_from_macros(
                self.values.protein_target,
                self.values.carbs_target,
                self.values.fat_target,
            );
        } else if self.state.is_engaged_with(GoalField::Calories) {
            let macros = macros_from_calories(value, self.baseline, self.default_split);
            self.programmatic(|ctrl| {
                ctrl.values.protein_target = macros.protein;
                ctrl.values.carbs_target = macros.carbs;
                ctrl.values.fat_target = macros.fat;
            });
        }

        self.dirty = self.values != self.committed;
    }
}
