pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod pricing;
pub mod validation;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, NoopAuditSink};
pub use config::{AppConfig, ConfigError, LoadOptions};
pub use domain::intent::{FulfillmentState, IntentState};
pub use domain::slots::{SlotMap, SlotName};
pub use domain::stay::StayDates;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{DialogAction, DialogDecision, DialogFlow, DialogSettings, DialogStep, FlowTrace};
pub use pricing::{FareCalculator, FareQuote, NightlyFareCalculator, RateTable, RoomRate};
pub use validation::{
    BookingSlotValidator, SlotValidator, SlotViolation, ValidationResult, ViolationKind,
};
