use serde::{Deserialize, Serialize};

use crate::domain::intent::{FulfillmentState, IntentState};
use crate::domain::slots::SlotName;
use crate::domain::stay::StayDates;
use crate::pricing::FareQuote;
use crate::validation::ValidationResult;

/// The gates a dialog turn passes through, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogStep {
    Validate,
    RoomTypeConfirmationGate,
    RoomTypeConfirmationCheck,
    ConfirmationGate,
    ConfirmationCheck,
}

impl DialogStep {
    pub const ORDER: [DialogStep; 5] = [
        DialogStep::Validate,
        DialogStep::RoomTypeConfirmationGate,
        DialogStep::RoomTypeConfirmationCheck,
        DialogStep::ConfirmationGate,
        DialogStep::ConfirmationCheck,
    ];

    pub fn next(self) -> Option<DialogStep> {
        match self {
            Self::Validate => Some(Self::RoomTypeConfirmationGate),
            Self::RoomTypeConfirmationGate => Some(Self::RoomTypeConfirmationCheck),
            Self::RoomTypeConfirmationCheck => Some(Self::ConfirmationGate),
            Self::ConfirmationGate => Some(Self::ConfirmationCheck),
            Self::ConfirmationCheck => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    ElicitSlot(SlotName),
    Close(FulfillmentState),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    SlotInvalid,
    RoomRateAnnounced,
    RoomTypeDeclined,
    ReservationSummarized,
    ReservationConfirmed,
    ReservationDeclined,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogDecision {
    pub action: DialogAction,
    pub intent_state: IntentState,
    pub messages: Vec<String>,
    pub reason: DecisionReason,
    pub fare: Option<FareQuote>,
}

impl DialogDecision {
    pub fn elicit(slot: SlotName, reason: DecisionReason, messages: Vec<String>) -> Self {
        Self {
            action: DialogAction::ElicitSlot(slot),
            intent_state: IntentState::InProgress,
            messages,
            reason,
            fare: None,
        }
    }

    pub fn close(state: FulfillmentState, reason: DecisionReason, message: String) -> Self {
        Self {
            action: DialogAction::Close(state),
            intent_state: state.into(),
            messages: vec![message],
            reason,
            fare: None,
        }
    }

    pub fn with_fare(mut self, fare: FareQuote) -> Self {
        self.fare = Some(fare);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Advance(DialogStep),
    Respond(DialogDecision),
}

/// What earlier steps hand to later ones within a single turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepContext {
    /// Validation already done by the caller; consumed by the Validate step.
    pub validated: Option<ValidationResult>,
    pub stay: Option<StayDates>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowTrace {
    pub visited: Vec<DialogStep>,
    pub decision: DialogDecision,
    /// Parsed stay dates, present once validation has passed.
    pub stay: Option<StayDates>,
}

impl FlowTrace {
    pub fn final_step(&self) -> Option<DialogStep> {
        self.visited.last().copied()
    }
}
