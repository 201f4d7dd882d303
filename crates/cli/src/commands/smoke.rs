use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use hotelbot_core::config::{AppConfig, LoadOptions};
use hotelbot_lex::DialogHandler;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

/// One scripted turn: the slots the caller has filled so far, and what the
/// handler is expected to answer.
struct Turn {
    name: &'static str,
    invocation_source: &'static str,
    slots: Map<String, Value>,
    expect: Expectation,
}

enum Expectation {
    Elicit { slot: &'static str, messages: usize },
    Close { fulfillment_state: &'static str },
    Ignored,
}

const CONVERSATION_CHECKS: [&str; 5] = [
    "location_elicited",
    "room_rate_announced",
    "reservation_summarized",
    "reservation_fulfilled",
    "fulfillment_hook_ignored",
];

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config_started = Instant::now();
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms: elapsed_ms(config_started),
                message: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err(error) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms: elapsed_ms(config_started),
                message: error.to_string(),
            });
            checks.extend(CONVERSATION_CHECKS.into_iter().map(skipped));
            return finalize_report(checks, elapsed_ms(started));
        }
    };

    let handler = DialogHandler::new(config.dialog_settings());
    let confirmation = config
        .dialog
        .confirmation_words
        .first()
        .cloned()
        .unwrap_or_else(|| "yes".to_string());

    for turn in script(&confirmation) {
        let turn_started = Instant::now();
        let (status, message) = play(&handler, &turn);
        checks.push(SmokeCheck {
            name: turn.name,
            status,
            elapsed_ms: elapsed_ms(turn_started),
            message,
        });
    }

    finalize_report(checks, elapsed_ms(started))
}

fn script(confirmation: &str) -> Vec<Turn> {
    let mut partial = booking_slots(confirmation);
    partial.remove("Location");
    partial.remove("RoomTypeConfirmation");
    partial.remove("Confirmation");

    let mut before_room_answer = booking_slots(confirmation);
    before_room_answer.remove("RoomTypeConfirmation");
    before_room_answer.remove("Confirmation");

    let mut before_confirmation = booking_slots(confirmation);
    before_confirmation.remove("Confirmation");

    vec![
        Turn {
            name: "location_elicited",
            invocation_source: "DialogCodeHook",
            slots: partial,
            expect: Expectation::Elicit { slot: "Location", messages: 1 },
        },
        Turn {
            name: "room_rate_announced",
            invocation_source: "DialogCodeHook",
            slots: before_room_answer,
            expect: Expectation::Elicit { slot: "RoomTypeConfirmation", messages: 1 },
        },
        Turn {
            name: "reservation_summarized",
            invocation_source: "DialogCodeHook",
            slots: before_confirmation,
            expect: Expectation::Elicit { slot: "Confirmation", messages: 2 },
        },
        Turn {
            name: "reservation_fulfilled",
            invocation_source: "DialogCodeHook",
            slots: booking_slots(confirmation),
            expect: Expectation::Close { fulfillment_state: "Fulfilled" },
        },
        Turn {
            name: "fulfillment_hook_ignored",
            invocation_source: "FulfillmentCodeHook",
            slots: booking_slots(confirmation),
            expect: Expectation::Ignored,
        },
    ]
}

fn play(handler: &DialogHandler, turn: &Turn) -> (SmokeStatus, String) {
    let event = json!({
        "sessionId": format!("smoke-{}", turn.name),
        "invocationSource": turn.invocation_source,
        "sessionState": {
            "intent": {"name": "BookHotel", "slots": Value::Object(turn.slots.clone()), "state": "InProgress"}
        }
    });

    let response = match handler.handle_json(&event, smoke_clock()) {
        Ok(response) => response,
        Err(error) => return (SmokeStatus::Fail, error.to_string()),
    };

    match (&turn.expect, response) {
        (Expectation::Ignored, None) => (SmokeStatus::Pass, "no response for non-dialog hook".to_string()),
        (Expectation::Ignored, Some(_)) => {
            (SmokeStatus::Fail, "expected no response for non-dialog hook".to_string())
        }
        (_, None) => (SmokeStatus::Fail, "handler ignored a dialog code hook".to_string()),
        (expect, Some(response)) => verify(expect, &response),
    }
}

fn verify(expect: &Expectation, response: &Value) -> (SmokeStatus, String) {
    let action = &response["sessionState"]["dialogAction"];
    let messages = response["messages"].as_array().map(Vec::len).unwrap_or(0);
    let first_message = response["messages"][0]["content"].as_str().unwrap_or_default();

    let matched = match expect {
        Expectation::Elicit { slot, messages: expected } => {
            action["type"] == "ElicitSlot" && action["slotToElicit"] == *slot && messages == *expected
        }
        Expectation::Close { fulfillment_state } => {
            action["type"] == "Close" && action["fulfillmentState"] == *fulfillment_state
        }
        Expectation::Ignored => false,
    };

    if matched {
        (SmokeStatus::Pass, first_message.to_string())
    } else {
        (SmokeStatus::Fail, format!("unexpected dialog action {action}: {first_message}"))
    }
}

/// Sample booking used by the scripted conversation: a suite in Mumbai for
/// three guests over four nights.
fn booking_slots(confirmation: &str) -> Map<String, Value> {
    let mut slots = Map::new();
    for (name, value) in [
        ("Location", "Mumbai"),
        ("CheckInDate", "2025-01-01"),
        ("CheckOutDate", "2025-01-05"),
        ("NumberOfGuests", "3"),
        ("RoomType", "Suite"),
        ("RoomTypeConfirmation", confirmation),
        ("Confirmation", confirmation),
    ] {
        slots.insert(
            name.to_string(),
            json!({"value": {"originalValue": value, "interpretedValue": value}, "shape": "Scalar"}),
        );
    }
    slots
}

fn smoke_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 12, 1)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
