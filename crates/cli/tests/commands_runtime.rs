use std::env;
use std::sync::{Mutex, OnceLock};

use hotelbot_cli::commands::{config, invoke, smoke};
use hotelbot_core::config::{AppConfig, LoadOptions};
use serde_json::{json, Value};

#[test]
fn smoke_passes_with_default_config() {
    with_env(&[], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0, "expected scripted conversation to pass: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "pass");
        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks.len(), 6);
        assert!(checks.iter().all(|check| check["status"] == "pass"));
    });
}

#[test]
fn smoke_quotes_configured_currency() {
    with_env(&[("HOTELBOT_PRICING_CURRENCY_SYMBOL", "€")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let fulfilled = payload["checks"]
            .as_array()
            .and_then(|checks| checks.iter().find(|check| check["name"] == "reservation_fulfilled"))
            .expect("fulfilled check");
        assert!(fulfilled["message"].as_str().unwrap_or_default().contains("€240"));
    });
}

#[test]
fn smoke_uses_configured_confirmation_word() {
    with_env(&[("HOTELBOT_DIALOG_CONFIRMATION_WORDS", "Confirmed, ok")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0, "{}", result.output);
    });
}

#[test]
fn smoke_skips_conversation_when_config_is_invalid() {
    with_env(&[("HOTELBOT_LOG_FORMAT", "xml")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "fail");
        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert!(checks[1..].iter().all(|check| check["status"] == "skipped"));
    });
}

#[test]
fn invoke_respond_fulfills_sample_booking() {
    let now = invoke::parse_now("2024-12-01T09:00:00").expect("timestamp");
    let event = json!({
        "sessionId": "cli-1",
        "invocationSource": "DialogCodeHook",
        "sessionState": {"intent": {"name": "BookHotel", "slots": {
            "Location": {"value": {"interpretedValue": "Mumbai"}},
            "CheckInDate": {"value": {"interpretedValue": "2025-01-01"}},
            "CheckOutDate": {"value": {"interpretedValue": "2025-01-05"}},
            "NumberOfGuests": {"value": {"interpretedValue": "3"}},
            "RoomType": {"value": {"interpretedValue": "Suite"}},
            "RoomTypeConfirmation": {"value": {"interpretedValue": "Yes"}},
            "Confirmation": {"value": {"interpretedValue": "I Confirm"}}
        }}}
    });

    let output = invoke::respond(&AppConfig::default(), &event.to_string(), now, true)
        .expect("rendered response");
    let response: Value = serde_json::from_str(&output).expect("json output");

    assert!(output.contains('\n'), "pretty output spans lines");
    assert_eq!(response["sessionState"]["dialogAction"]["fulfillmentState"], "Fulfilled");
    assert_eq!(
        response["messages"][0]["content"],
        "Thank you for confirming your reservation! Your total fare is $240. We look forward to your stay."
    );
    assert_eq!(response["sessionState"]["intent"]["slots"], event["sessionState"]["intent"]["slots"]);
}

#[test]
fn invoke_respond_uses_rates_from_config_file() {
    with_env(&[], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hotelbot.toml");
        std::fs::write(
            &path,
            "[pricing]\ncurrency_symbol = \"£\"\n\n[[pricing.rooms]]\nname = \"Suite\"\nnightly_rate = \"30\"\n",
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            ..LoadOptions::default()
        })
        .expect("config loads");
        let now = invoke::parse_now("2024-12-01T09:00:00").expect("timestamp");
        let event = json!({
            "invocationSource": "DialogCodeHook",
            "sessionState": {"intent": {"name": "BookHotel", "slots": {
                "Location": {"value": {"interpretedValue": "Mumbai"}},
                "CheckInDate": {"value": {"interpretedValue": "2025-01-01"}},
                "CheckOutDate": {"value": {"interpretedValue": "2025-01-03"}},
                "NumberOfGuests": {"value": {"interpretedValue": "2"}},
                "RoomType": {"value": {"interpretedValue": "Suite"}}
            }}}
        });

        let output =
            invoke::respond(&config, &event.to_string(), now, false).expect("rendered response");
        let response: Value = serde_json::from_str(&output).expect("json output");

        assert_eq!(response["sessionState"]["dialogAction"]["slotToElicit"], "RoomTypeConfirmation");
        let announcement = response["messages"][0]["content"].as_str().unwrap_or_default();
        assert!(announcement.contains("£30 per night"), "got {announcement}");
    });
}

#[test]
fn config_reports_env_sources() {
    with_env(
        &[("HOTELBOT_PRICING_CURRENCY_SYMBOL", "€"), ("HOTELBOT_LOG_LEVEL", "debug")],
        || {
            let result = config::run();
            let output = result.output;

            assert_eq!(result.exit_code, 0);
            assert!(output.starts_with("effective config"));
            assert!(output.contains(
                "- pricing.currency_symbol = € (source: env (HOTELBOT_PRICING_CURRENCY_SYMBOL))"
            ));
            assert!(output.contains("- logging.level = debug (source: env (HOTELBOT_LOG_LEVEL))"));
            assert!(output.contains("- pricing.fare_fallback = 10 (source: default)"));
            assert!(output.contains("Premium Suite=25"));
        },
    );
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("HOTELBOT_PRICING_FARE_FALLBACK", "ten")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn parse_payload(output: &str) -> Value {
    let json_line = output.lines().last().expect("output should contain a payload line");
    serde_json::from_str(json_line).expect("payload should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "HOTELBOT_DIALOG_CONFIRMATION_WORDS",
        "HOTELBOT_PRICING_CURRENCY_SYMBOL",
        "HOTELBOT_PRICING_ANNOUNCEMENT_FALLBACK",
        "HOTELBOT_PRICING_FARE_FALLBACK",
        "HOTELBOT_LOGGING_LEVEL",
        "HOTELBOT_LOGGING_FORMAT",
        "HOTELBOT_LOG_LEVEL",
        "HOTELBOT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
