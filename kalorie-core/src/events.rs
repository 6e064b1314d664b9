//! Application events and the bus that carries them.

use tokio::sync::broadcast;

use crate::models::{EntryId, Food, MealType};

const DEFAULT_CAPACITY: usize = 64;

/// Events raised by views and controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    AddFood {
        meal_type: MealType,
    },
    EditFood {
        entry_id: EntryId,
        food_id: i64,
        meal_type: MealType,
    },
    /// A food and amount were confirmed for a meal
    AcceptFood {
        food: Food,
        amount_grams: f64,
        meal_type: MealType,
    },
    FoodSelect {
        food_id: i64,
    },
    DeleteEntry {
        entry_id: EntryId,
    },
    AddExercise,
    EditExercise {
        exercise_id: i64,
    },
    DeleteExercise {
        exercise_id: i64,
    },
    AddWeight,
    EditWeight {
        weight_id: i64,
    },
    DeleteWeight {
        weight_id: i64,
    },
    StickyStateChange {
        is_sticky: bool,
    },
    DashboardNavigation,
    /// New goals were written to the backend
    GoalsCommitted,
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::AddFood { .. } => "onAddFood",
            AppEvent::EditFood { .. } => "onEditFood",
            AppEvent::AcceptFood { .. } => "onAcceptFood",
            AppEvent::FoodSelect { .. } => "onFoodSelect",
            AppEvent::DeleteEntry { .. } => "onDeleteEntry",
            AppEvent::AddExercise => "onAddExercise",
            AppEvent::EditExercise { .. } => "onEditExercise",
            AppEvent::DeleteExercise { .. } => "onDeleteExercise",
            AppEvent::AddWeight => "onAddWeight",
            AppEvent::EditWeight { .. } => "onEditWeight",
            AppEvent::DeleteWeight { .. } => "onDeleteWeight",
            AppEvent::StickyStateChange { .. } => "onStickyStateChange",
            AppEvent::DashboardNavigation => "dashboardNavigation",
            AppEvent::GoalsCommitted => "goalsCommitted",
        }
    }
}

/// Fan-out channel for [`AppEvent`]s.
///
/// Publishing with no subscribers is not an error; the event is dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns the number of receivers it reached.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::debug!(event = event.name(), "publishing event");
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
