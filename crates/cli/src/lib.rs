pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hotelbot_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "hotelbot",
    about = "Hotel booking dialog hook CLI",
    long_about = "Run the hotel booking dialog code hook against Lex events, inspect configuration, and smoke-test the booking conversation.",
    after_help = "Examples:\n  hotelbot invoke --event event.json --pretty\n  cat event.json | hotelbot invoke --now 2025-01-01T09:00:00\n  hotelbot config\n  hotelbot smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Handle one Lex event read from a file or stdin and print the response JSON")]
    Invoke {
        #[arg(long, help = "Path to the event JSON (stdin when omitted)")]
        event: Option<PathBuf>,
        #[arg(long, help = "Evaluate as of this local time, formatted YYYY-MM-DDTHH:MM:SS")]
        now: Option<String>,
        #[arg(long, help = "Pretty-print the response JSON")]
        pretty: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Replay a scripted booking conversation and report per-check results")]
    Smoke,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => init_logging(&config),
        Err(error) => {
            init_logging(&AppConfig::default());
            tracing::warn!(
                event_name = "cli.config.invalid",
                correlation_id = "cli",
                error = %error,
                "configuration failed to load; logging with defaults"
            );
        }
    }

    let result = match cli.command {
        Command::Invoke { event, now, pretty } => {
            commands::invoke::run(commands::invoke::InvokeArgs { event, now, pretty })
        }
        Command::Config => commands::config::run(),
        Command::Smoke => commands::smoke::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr; stdout carries the command payload.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder =
        tracing_subscriber::fmt().with_target(false).with_env_filter(filter).with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
