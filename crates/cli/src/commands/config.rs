use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use hotelbot_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", error.to_string(), 2)
        }
    };

    let file = ConfigFile::detect();
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(file.line(
        "dialog.confirmation_words",
        &config.dialog.confirmation_words.join(", "),
        &["HOTELBOT_DIALOG_CONFIRMATION_WORDS"],
    ));
    lines.push(file.line(
        "pricing.currency_symbol",
        &config.pricing.currency_symbol,
        &["HOTELBOT_PRICING_CURRENCY_SYMBOL"],
    ));
    lines.push(file.line(
        "pricing.announcement_fallback",
        &config.pricing.announcement_fallback.to_string(),
        &["HOTELBOT_PRICING_ANNOUNCEMENT_FALLBACK"],
    ));
    lines.push(file.line(
        "pricing.fare_fallback",
        &config.pricing.fare_fallback.to_string(),
        &["HOTELBOT_PRICING_FARE_FALLBACK"],
    ));

    let rooms = config
        .pricing
        .rooms
        .iter()
        .map(|room| format!("{}={}", room.name, room.nightly_rate))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(file.line("pricing.rooms", &rooms, &[]));

    lines.push(file.line(
        "logging.level",
        &config.logging.level,
        &["HOTELBOT_LOGGING_LEVEL", "HOTELBOT_LOG_LEVEL"],
    ));
    lines.push(file.line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        &["HOTELBOT_LOGGING_FORMAT", "HOTELBOT_LOG_FORMAT"],
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

struct ConfigFile {
    path: Option<PathBuf>,
    doc: Option<Value>,
}

impl ConfigFile {
    fn detect() -> Self {
        let path = resolve_config_path(None);
        let doc = path.as_deref().and_then(load_doc);
        Self { path, doc }
    }

    fn line(&self, key_path: &str, value: &str, env_keys: &[&str]) -> String {
        format!("- {key_path} = {value} (source: {})", self.source(key_path, env_keys))
    }

    fn source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if self.doc.as_ref().is_some_and(|doc| contains_path(doc, key_path)) {
            let file_path = self
                .path
                .as_deref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }

        "default".to_string()
    }
}

fn load_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
