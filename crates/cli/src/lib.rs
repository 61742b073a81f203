pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use roomrate_core::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "roomrate",
    about = "Roomrate lodging quote engine CLI",
    long_about = "Drive the quote conversation locally, price stays one-off, and inspect or \
                  validate the effective configuration.",
    after_help = "Examples:\n  roomrate chat\n  roomrate quote --dates 3/20-3/22 --guests 4\n  roomrate doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a roomrate.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Chat with the quote engine line by line on stdin")]
    Chat {
        #[arg(long, default_value = "local-user", help = "User id the session is keyed by")]
        user: String,
    },
    #[command(about = "Price a stay directly, without the conversation flow")]
    Quote {
        #[arg(long, help = "Date or date range, e.g. 3/20 or 3/20-3/22")]
        dates: String,
        #[arg(long, help = "Guest count, 1 through 8")]
        guests: u32,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the effective configuration as TOML")]
    Config,
    #[command(about = "Load and validate configuration, then report readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Chat { user } => commands::chat::run(&config, &user),
        Command::Quote { dates, guests, json } => {
            commands::quote::run(&config, &dates, guests, json)
        }
        Command::Config => commands::config::run(&config),
        Command::Doctor { json } => commands::doctor::run(&config, json),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use roomrate_core::LogFormat::{Compact, Json, Pretty};
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
