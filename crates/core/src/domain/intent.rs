use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentState {
    InProgress,
    Fulfilled,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FulfillmentState {
    Fulfilled,
    Failed,
}

impl IntentState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Failed)
    }

    pub fn can_transition_to(self, next: IntentState) -> bool {
        matches!(
            (self, next),
            (Self::InProgress, _) | (Self::Fulfilled, Self::Fulfilled) | (Self::Failed, Self::Failed)
        )
    }

    pub fn transition_to(&mut self, next: IntentState) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            *self = next;
            return Ok(());
        }

        Err(DomainError::InvariantViolation(format!(
            "intent cannot move from {self:?} to {next:?}"
        )))
    }
}

impl From<FulfillmentState> for IntentState {
    fn from(value: FulfillmentState) -> Self {
        match value {
            FulfillmentState::Fulfilled => Self::Fulfilled,
            FulfillmentState::Failed => Self::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FulfillmentState, IntentState};

    #[test]
    fn in_progress_may_move_anywhere() {
        let mut state = IntentState::InProgress;
        assert!(state.transition_to(IntentState::InProgress).is_ok());
        assert!(state.transition_to(IntentState::Fulfilled).is_ok());
        assert_eq!(state, IntentState::Fulfilled);
    }

    #[test]
    fn terminal_states_stay_terminal() {
        let mut state = IntentState::Failed;
        assert!(state.is_terminal());
        assert!(state.transition_to(IntentState::InProgress).is_err());
        assert!(state.transition_to(IntentState::Fulfilled).is_err());
        assert_eq!(state, IntentState::Failed);
        assert!(IntentState::Fulfilled.can_transition_to(IntentState::Fulfilled));
    }

    #[test]
    fn fulfillment_maps_onto_intent_state() {
        assert_eq!(IntentState::from(FulfillmentState::Fulfilled), IntentState::Fulfilled);
        assert_eq!(IntentState::from(FulfillmentState::Failed), IntentState::Failed);
    }
}
