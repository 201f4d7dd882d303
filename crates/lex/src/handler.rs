use std::sync::Arc;

use chrono::NaiveDateTime;
use hotelbot_core::domain::slots::echo_slots;
use hotelbot_core::{
    ApplicationError, AuditContext, AuditSink, DialogFlow, DialogSettings, DomainError,
    NoopAuditSink, SlotMap,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::envelope::{LexEvent, LexResponse, DIALOG_CODE_HOOK};

const UNKNOWN_INTENT: &str = "Unknown";

#[derive(Clone, Debug, PartialEq)]
pub enum HandlerResult {
    Responded(LexResponse),
    /// The event came from an invocation phase this handler does not act on.
    Ignored { invocation_source: String },
}

impl HandlerResult {
    pub fn response(&self) -> Option<&LexResponse> {
        match self {
            Self::Responded(response) => Some(response),
            Self::Ignored { .. } => None,
        }
    }

    pub fn into_response(self) -> Option<LexResponse> {
        match self {
            Self::Responded(response) => Some(response),
            Self::Ignored { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("could not encode dialog response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whatever could be read from the event before something went wrong; used to
/// fill the failure response.
#[derive(Debug, Default)]
struct Captured {
    slots: Option<Value>,
    intent_name: Option<String>,
}

impl Captured {
    /// The intent name to echo; blank names read as unknown.
    fn intent_label(&self) -> &str {
        self.intent_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(UNKNOWN_INTENT)
    }

    fn salvage(raw: &Value) -> Self {
        Self {
            slots: raw.pointer("/sessionState/intent/slots").cloned(),
            intent_name: raw
                .pointer("/sessionState/intent/name")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

/// Entry point for dialog code hook invocations of the hotel booking intent.
///
/// A turn never fails outward: structural problems in the event become a
/// closed, failed intent with a generic apology.
pub struct DialogHandler {
    flow: DialogFlow,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditSink>,
}

impl Default for DialogHandler {
    fn default() -> Self {
        Self::new(DialogSettings::default())
    }
}

impl DialogHandler {
    pub fn new(settings: DialogSettings) -> Self {
        Self {
            flow: DialogFlow::from_settings(settings),
            clock: Arc::new(SystemClock),
            audit: Arc::new(NoopAuditSink),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn settings(&self) -> &DialogSettings {
        self.flow.settings()
    }

    pub fn handle_now(&self, event: &LexEvent) -> HandlerResult {
        self.handle(event, self.clock.now())
    }

    pub fn handle(&self, event: &LexEvent, now: NaiveDateTime) -> HandlerResult {
        let correlation_id = event.session_id.as_deref().unwrap_or("unknown");
        let mut captured = Captured::default();

        match self.decide(event, now, correlation_id, &mut captured) {
            Ok(Some(response)) => HandlerResult::Responded(response),
            Ok(None) => {
                let invocation_source = event.invocation_source.clone().unwrap_or_default();
                debug!(
                    event_name = "dialog.turn.ignored",
                    correlation_id,
                    invocation_source = invocation_source.as_str(),
                    "invocation source is not handled"
                );
                HandlerResult::Ignored { invocation_source }
            }
            Err(error) => HandlerResult::Responded(failure_response(
                ApplicationError::from(error),
                captured,
                correlation_id,
            )),
        }
    }

    /// Raw JSON in, raw JSON out. `None` is what an ignored invocation maps to.
    pub fn handle_json(&self, raw: &Value, now: NaiveDateTime) -> Result<Option<Value>, HandlerError> {
        let result = match serde_json::from_value::<LexEvent>(raw.clone()) {
            Ok(event) => self.handle(&event, now),
            Err(error) => HandlerResult::Responded(failure_response(
                ApplicationError::Serialization(error.to_string()),
                Captured::salvage(raw),
                "unknown",
            )),
        };

        result.into_response().map(serde_json::to_value).transpose().map_err(HandlerError::from)
    }

    fn decide(
        &self,
        event: &LexEvent,
        now: NaiveDateTime,
        correlation_id: &str,
        captured: &mut Captured,
    ) -> Result<Option<LexResponse>, DomainError> {
        let intent = event.intent().ok_or(DomainError::MissingField("sessionState.intent"))?;
        let raw_slots = intent.slots.clone().ok_or(DomainError::MissingField("slots"))?;
        captured.slots = Some(raw_slots.clone());
        let intent_name = intent.name.as_deref().ok_or(DomainError::MissingField("name"))?;
        captured.intent_name = Some(intent_name.to_owned());

        // Malformed slots fail the turn whatever the invocation source.
        let slots = SlotMap::from_value(raw_slots)?;
        let validated = self.flow.validate(&slots, now)?;

        let invocation_source = event
            .invocation_source
            .as_deref()
            .ok_or(DomainError::MissingField("invocationSource"))?;
        if invocation_source != DIALOG_CODE_HOOK {
            return Ok(None);
        }

        let audit = AuditContext::new(
            event.session_id.clone(),
            Some(intent_name.to_owned()),
            correlation_id,
            "dialog-handler",
        );
        let trace =
            self.flow.resume_with_audit(validated, &slots, now, self.audit.as_ref(), &audit)?;

        info!(
            event_name = "dialog.turn.decided",
            correlation_id,
            intent = intent_name,
            step = ?trace.final_step(),
            reason = ?trace.decision.reason,
            intent_state = ?trace.decision.intent_state,
            nights = trace.stay.map(|stay| stay.nights()),
            "dialog turn decided"
        );

        Ok(Some(LexResponse::from_decision(intent_name, slots.into_value(), trace.decision)))
    }
}

fn failure_response(error: ApplicationError, captured: Captured, correlation_id: &str) -> LexResponse {
    let interface = error.into_interface(correlation_id);
    let intent = captured.intent_label();
    warn!(
        event_name = "dialog.turn.failed",
        correlation_id = interface.correlation_id(),
        intent,
        error = %interface,
        "error processing dialog turn"
    );

    LexResponse::failure(intent, echo_slots(captured.slots.as_ref()), interface.user_message())
}
