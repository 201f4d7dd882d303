use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use hotelbot_core::config::{AppConfig, LoadOptions};
use hotelbot_lex::{Clock, DialogHandler, SystemClock};
use serde_json::Value;

use crate::commands::CommandResult;

pub const NOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone, Debug, Default)]
pub struct InvokeArgs {
    pub event: Option<PathBuf>,
    pub now: Option<String>,
    pub pretty: bool,
}

pub fn run(args: InvokeArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("invoke", "config_validation", error.to_string(), 2)
        }
    };

    let outcome = read_event(args.event.as_deref()).and_then(|raw| {
        let now = match args.now.as_deref() {
            Some(text) => parse_now(text)?,
            None => SystemClock.now(),
        };
        respond(&config, &raw, now, args.pretty)
    });

    match outcome {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("invoke", "invalid_input", format!("{error:#}"), 3),
    }
}

/// Runs one event through the handler and renders what Lex would receive.
/// Events from other invocation sources render as `null`.
pub fn respond(config: &AppConfig, raw_event: &str, now: NaiveDateTime, pretty: bool) -> Result<String> {
    let event: Value = serde_json::from_str(raw_event).context("event is not valid JSON")?;
    let handler = DialogHandler::new(config.dialog_settings());
    let response = handler.handle_json(&event, now)?.unwrap_or(Value::Null);

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(rendered)
}

pub fn parse_now(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), NOW_FORMAT)
        .with_context(|| format!("`{text}` is not a YYYY-MM-DDTHH:MM:SS timestamp"))
}

fn read_event(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("could not read event file `{}`", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw).context("could not read event from stdin")?;
            Ok(raw)
        }
    }
}
