use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flows::DialogSettings;
use crate::pricing::{RateTable, RoomRate};

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub dialog: DialogConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DialogConfig {
    pub confirmation_words: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    pub currency_symbol: String,
    pub announcement_fallback: Decimal,
    pub fare_fallback: Decimal,
    pub rooms: Vec<RoomRate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub currency_symbol: Option<String>,
    pub confirmation_words: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["hotelbot.toml", "config/hotelbot.toml"];

impl Default for AppConfig {
    fn default() -> Self {
        let rates = RateTable::default();
        Self {
            dialog: DialogConfig {
                confirmation_words: vec!["yes".to_string(), "i confirm".to_string()],
            },
            pricing: PricingConfig {
                currency_symbol: "$".to_string(),
                announcement_fallback: rates.announcement_fallback,
                fare_fallback: rates.fare_fallback,
                rooms: rates.rooms().to_vec(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn rate_table(&self) -> RateTable {
        RateTable::new(
            self.pricing.rooms.clone(),
            self.pricing.announcement_fallback,
            self.pricing.fare_fallback,
        )
    }

    pub fn dialog_settings(&self) -> DialogSettings {
        DialogSettings {
            rates: self.rate_table(),
            confirmation_words: self
                .dialog
                .confirmation_words
                .iter()
                .map(|word| word.to_lowercase())
                .collect(),
            currency_symbol: self.pricing.currency_symbol.clone(),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(dialog) = patch.dialog {
            if let Some(confirmation_words) = dialog.confirmation_words {
                self.dialog.confirmation_words = confirmation_words;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(currency_symbol) = pricing.currency_symbol {
                self.pricing.currency_symbol = currency_symbol;
            }
            if let Some(announcement_fallback) = pricing.announcement_fallback {
                self.pricing.announcement_fallback = announcement_fallback;
            }
            if let Some(fare_fallback) = pricing.fare_fallback {
                self.pricing.fare_fallback = fare_fallback;
            }
            if let Some(rooms) = pricing.rooms {
                self.pricing.rooms = rooms
                    .into_iter()
                    .map(|room| RoomRate::new(room.name, room.nightly_rate))
                    .collect();
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HOTELBOT_DIALOG_CONFIRMATION_WORDS") {
            self.dialog.confirmation_words = split_list(&value);
        }

        if let Some(value) = read_env("HOTELBOT_PRICING_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = value;
        }
        if let Some(value) = read_env("HOTELBOT_PRICING_ANNOUNCEMENT_FALLBACK") {
            self.pricing.announcement_fallback =
                parse_decimal("HOTELBOT_PRICING_ANNOUNCEMENT_FALLBACK", &value)?;
        }
        if let Some(value) = read_env("HOTELBOT_PRICING_FARE_FALLBACK") {
            self.pricing.fare_fallback = parse_decimal("HOTELBOT_PRICING_FARE_FALLBACK", &value)?;
        }

        let log_level =
            read_env("HOTELBOT_LOGGING_LEVEL").or_else(|| read_env("HOTELBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HOTELBOT_LOGGING_FORMAT").or_else(|| read_env("HOTELBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(currency_symbol) = overrides.currency_symbol {
            self.pricing.currency_symbol = currency_symbol;
        }
        if let Some(confirmation_words) = overrides.confirmation_words {
            self.dialog.confirmation_words = confirmation_words;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dialog(&self.dialog)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${VAR}` references before the file is parsed.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || !matches!(chars.peek(), Some('{')) {
            output.push(ch);
            continue;
        }

        chars.next();
        let mut var = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(next) => var.push(next),
                None => return Err(ConfigError::UnterminatedInterpolation),
            }
        }

        let value = env::var(&var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.clone() })?;
        output.push_str(&value);
    }

    Ok(output)
}

fn validate_dialog(dialog: &DialogConfig) -> Result<(), ConfigError> {
    if dialog.confirmation_words.is_empty() {
        return Err(ConfigError::Validation(
            "dialog.confirmation_words must list at least one accepted answer".to_string(),
        ));
    }
    if dialog.confirmation_words.iter().any(|word| word.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "dialog.confirmation_words must not contain blank entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.rooms.is_empty() {
        return Err(ConfigError::Validation(
            "pricing.rooms must define at least one room type".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for room in &pricing.rooms {
        if room.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pricing.rooms entries need a non-empty name".to_string(),
            ));
        }
        if !seen.insert(room.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "pricing.rooms lists `{}` more than once",
                room.name
            )));
        }
        if room.nightly_rate.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "pricing.rooms `{}` has a negative nightly_rate",
                room.name
            )));
        }
    }

    if pricing.announcement_fallback.is_sign_negative() || pricing.fare_fallback.is_sign_negative()
    {
        return Err(ConfigError::Validation(
            "pricing.announcement_fallback and pricing.fare_fallback must not be negative"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect()
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    dialog: Option<DialogPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DialogPatch {
    confirmation_words: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    currency_symbol: Option<String>,
    announcement_fallback: Option<Decimal>,
    fare_fallback: Option<Decimal>,
    rooms: Option<Vec<RoomPatch>>,
}

#[derive(Debug, Deserialize)]
struct RoomPatch {
    name: String,
    nightly_rate: Decimal,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
