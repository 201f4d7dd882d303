use chrono::NaiveDateTime;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::intent::FulfillmentState;
use crate::domain::slots::{SlotMap, SlotName};
use crate::errors::DomainError;
use crate::flows::states::{
    DecisionReason, DialogDecision, DialogStep, FlowTrace, StepContext, StepOutcome,
};
use crate::pricing::{parse_guest_count, FareCalculator, NightlyFareCalculator, RateTable};
use crate::validation::{BookingSlotValidator, SlotValidator, ValidationResult};

pub const ROOM_TYPE_DECLINED: &str =
    "You did not confirm the room type. Please try again if you wish to make a reservation.";
pub const CONFIRMATION_PROMPT: &str = "Type 'Yes' to confirm or 'No' to cancel.";
pub const RESERVATION_DECLINED: &str =
    "Reservation was not confirmed. Please try again if you wish to make a reservation.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogSettings {
    pub rates: RateTable,
    /// Lower-case answers that count as "yes".
    pub confirmation_words: Vec<String>,
    pub currency_symbol: String,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            rates: RateTable::default(),
            confirmation_words: vec!["yes".to_owned(), "i confirm".to_owned()],
            currency_symbol: "$".to_owned(),
        }
    }
}

impl DialogSettings {
    pub fn is_confirmation(&self, answer: &str) -> bool {
        let answer = answer.to_lowercase();
        self.confirmation_words.iter().any(|word| *word == answer)
    }
}

/// Walks a turn through the booking gates. Holds no per-session state: every
/// call starts again at [`DialogStep::Validate`] and decides from the slots
/// alone.
pub struct DialogFlow<V = BookingSlotValidator, F = NightlyFareCalculator> {
    validator: V,
    fares: F,
    settings: DialogSettings,
}

impl DialogFlow {
    pub fn from_settings(settings: DialogSettings) -> Self {
        Self::new(
            BookingSlotValidator::new(settings.rates.clone()),
            NightlyFareCalculator::new(settings.rates.clone()),
            settings,
        )
    }
}

impl Default for DialogFlow {
    fn default() -> Self {
        Self::from_settings(DialogSettings::default())
    }
}

impl<V, F> DialogFlow<V, F>
where
    V: SlotValidator,
    F: FareCalculator,
{
    pub fn new(validator: V, fares: F, settings: DialogSettings) -> Self {
        Self { validator, fares, settings }
    }

    pub fn settings(&self) -> &DialogSettings {
        &self.settings
    }

    pub fn validate(&self, slots: &SlotMap, now: NaiveDateTime) -> Result<ValidationResult, DomainError> {
        self.validator.validate(slots, now)
    }

    pub fn run(&self, slots: &SlotMap, now: NaiveDateTime) -> Result<FlowTrace, DomainError> {
        self.walk(StepContext::default(), slots, now)
    }

    /// Finishes a turn whose slots the caller has already validated.
    pub fn resume(
        &self,
        validated: ValidationResult,
        slots: &SlotMap,
        now: NaiveDateTime,
    ) -> Result<FlowTrace, DomainError> {
        self.walk(StepContext { validated: Some(validated), stay: None }, slots, now)
    }

    pub fn run_with_audit<S>(
        &self,
        slots: &SlotMap,
        now: NaiveDateTime,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<FlowTrace, DomainError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.run(slots, now);
        record_outcome(&result, sink, audit);
        result
    }

    pub fn resume_with_audit<S>(
        &self,
        validated: ValidationResult,
        slots: &SlotMap,
        now: NaiveDateTime,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<FlowTrace, DomainError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.resume(validated, slots, now);
        record_outcome(&result, sink, audit);
        result
    }

    fn walk(
        &self,
        mut context: StepContext,
        slots: &SlotMap,
        now: NaiveDateTime,
    ) -> Result<FlowTrace, DomainError> {
        let mut visited = Vec::with_capacity(DialogStep::ORDER.len());
        let mut current = DialogStep::Validate;

        loop {
            visited.push(current);
            match self.step(current, slots, now, &mut context)? {
                StepOutcome::Respond(decision) => {
                    return Ok(FlowTrace { visited, decision, stay: context.stay });
                }
                StepOutcome::Advance(next) => current = next,
            }
        }
    }

    pub fn step(
        &self,
        current: DialogStep,
        slots: &SlotMap,
        now: NaiveDateTime,
        context: &mut StepContext,
    ) -> Result<StepOutcome, DomainError> {
        use DialogStep::{
            ConfirmationCheck, ConfirmationGate, RoomTypeConfirmationCheck,
            RoomTypeConfirmationGate, Validate,
        };

        let outcome = match current {
            Validate => {
                let validated = match context.validated.take() {
                    Some(validated) => validated,
                    None => self.validator.validate(slots, now)?,
                };
                match validated {
                    ValidationResult::Invalid(violation) => {
                        StepOutcome::Respond(DialogDecision::elicit(
                            violation.slot,
                            DecisionReason::SlotInvalid,
                            vec![violation.message],
                        ))
                    }
                    ValidationResult::Valid(stay) => {
                        context.stay = Some(stay);
                        StepOutcome::Advance(RoomTypeConfirmationGate)
                    }
                }
            }
            RoomTypeConfirmationGate => {
                if slots.has_value(SlotName::RoomTypeConfirmation)? {
                    StepOutcome::Advance(RoomTypeConfirmationCheck)
                } else {
                    let room_type = slots.interpreted(SlotName::RoomType)?;
                    let rate = self.settings.rates.announced_rate(room_type);
                    StepOutcome::Respond(DialogDecision::elicit(
                        SlotName::RoomTypeConfirmation,
                        DecisionReason::RoomRateAnnounced,
                        vec![format!(
                            "{room_type} rooms cost {}{rate} per night. Do you wish to continue?",
                            self.settings.currency_symbol
                        )],
                    ))
                }
            }
            RoomTypeConfirmationCheck => {
                let answer = slots.interpreted(SlotName::RoomTypeConfirmation)?;
                if self.settings.is_confirmation(answer) {
                    StepOutcome::Advance(ConfirmationGate)
                } else {
                    StepOutcome::Respond(DialogDecision::close(
                        FulfillmentState::Failed,
                        DecisionReason::RoomTypeDeclined,
                        ROOM_TYPE_DECLINED.to_owned(),
                    ))
                }
            }
            ConfirmationGate => {
                if slots.has_value(SlotName::Confirmation)? {
                    StepOutcome::Advance(ConfirmationCheck)
                } else {
                    StepOutcome::Respond(DialogDecision::elicit(
                        SlotName::Confirmation,
                        DecisionReason::ReservationSummarized,
                        vec![reservation_summary(slots)?, CONFIRMATION_PROMPT.to_owned()],
                    ))
                }
            }
            ConfirmationCheck => {
                let answer = slots.interpreted(SlotName::Confirmation)?;
                if self.settings.is_confirmation(answer) {
                    let fare = self.fares.calculate_fare(
                        slots.interpreted(SlotName::CheckInDate)?,
                        slots.interpreted(SlotName::CheckOutDate)?,
                        parse_guest_count(slots.interpreted(SlotName::NumberOfGuests)?)?,
                        slots.interpreted(SlotName::RoomType)?,
                    )?;
                    let message = format!(
                        "Thank you for confirming your reservation! Your total fare is {}{}. We look forward to your stay.",
                        self.settings.currency_symbol, fare.total
                    );
                    StepOutcome::Respond(
                        DialogDecision::close(
                            FulfillmentState::Fulfilled,
                            DecisionReason::ReservationConfirmed,
                            message,
                        )
                        .with_fare(fare),
                    )
                } else {
                    StepOutcome::Respond(DialogDecision::close(
                        FulfillmentState::Failed,
                        DecisionReason::ReservationDeclined,
                        RESERVATION_DECLINED.to_owned(),
                    ))
                }
            }
        };

        Ok(outcome)
    }
}

fn record_outcome<S>(result: &Result<FlowTrace, DomainError>, sink: &S, audit: &AuditContext)
where
    S: AuditSink + ?Sized,
{
    match result {
        Ok(trace) => {
            let event = AuditEvent::new(
                audit,
                "dialog.decision_made",
                AuditCategory::Dialog,
                AuditOutcome::Success,
            )
            .with_metadata("step", format!("{:?}", trace.final_step()))
            .with_metadata("reason", format!("{:?}", trace.decision.reason))
            .with_metadata("action", format!("{:?}", trace.decision.action))
            .with_metadata("intent_state", format!("{:?}", trace.decision.intent_state));
            sink.emit(event);
            if let Some(fare) = &trace.decision.fare {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "pricing.fare_computed",
                        AuditCategory::Pricing,
                        AuditOutcome::Success,
                    )
                    .with_metadata("room_type", fare.room_type.clone())
                    .with_metadata("nights", fare.nights.to_string())
                    .with_metadata("guests", fare.guests.to_string())
                    .with_metadata("total", fare.total.to_string()),
                );
            }
        }
        Err(error) => {
            sink.emit(
                AuditEvent::new(
                    audit,
                    "dialog.decision_failed",
                    AuditCategory::Dialog,
                    AuditOutcome::Failed,
                )
                .with_metadata("error", error.to_string()),
            );
        }
    }
}

fn reservation_summary(slots: &SlotMap) -> Result<String, DomainError> {
    Ok(format!(
        "Please confirm your reservation details: Check-in Date: {}, Check-out Date: {}, Number of Guests: {}, Room Type: {}.",
        slots.interpreted(SlotName::CheckInDate)?,
        slots.interpreted(SlotName::CheckOutDate)?,
        slots.interpreted(SlotName::NumberOfGuests)?,
        slots.interpreted(SlotName::RoomType)?,
    ))
}
