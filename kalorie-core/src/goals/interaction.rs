use std::fmt;

use super::field::GoalField;

/// Who is currently changing the goal fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// The user is editing `field`; its changes drive recomputation
    UserEngaged(GoalField),
    /// Values are being pushed to the fields; their change notifications are ignored
    ProgrammaticUpdate,
}

impl InteractionState {
    pub fn is_engaged_with(&self, field: GoalField) -> bool {
        *self == InteractionState::UserEngaged(field)
    }

    /// Whether a change notification for `field` should be treated as user input.
    pub fn accepts_user_change(&self, field: GoalField) -> bool {
        match self {
            InteractionState::Idle => true,
            InteractionState::UserEngaged(engaged) => *engaged == field,
            InteractionState::ProgrammaticUpdate => false,
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionState::Idle => write!(f, "idle"),
            InteractionState::UserEngaged(field) => write!(f, "editing {}", field),
            InteractionState::ProgrammaticUpdate => write!(f, "updating"),
        }
    }
}
