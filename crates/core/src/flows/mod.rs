pub mod engine;
pub mod states;

pub use engine::{DialogFlow, DialogSettings};
pub use states::{
    DecisionReason, DialogAction, DialogDecision, DialogStep, FlowTrace, StepContext, StepOutcome,
};
