pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use webforge_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "webforge",
    about = "Webforge operator CLI",
    long_about = "Operate the agency back office: quote estimates, catalog inspection, config review, and readiness checks.",
    after_help = "Examples:\n  webforge estimate --service websites --feature cms --feature seo --pages 10 --timeline rush\n  webforge catalog\n  webforge doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute a quote estimate for a service selection")]
    Estimate {
        #[arg(long, help = "Service id from the catalog, e.g. websites")]
        service: String,
        #[arg(long = "feature", help = "Feature id to add; repeat for several")]
        features: Vec<String>,
        #[arg(long, help = "Page count (only priced for the page-priced service)")]
        pages: Option<u32>,
        #[arg(long, default_value = "standard", help = "Timeline id, e.g. standard or rush")]
        timeline: String,
        #[arg(long, help = "Path to a catalog TOML file instead of the built-in catalog")]
        catalog: Option<PathBuf>,
        #[arg(long, help = "Emit the estimate breakdown as JSON")]
        json: bool,
    },
    #[command(about = "Load and validate the active pricing catalog, then print a summary")]
    Catalog {
        #[arg(long, help = "Path to a catalog TOML file instead of the built-in catalog")]
        catalog: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog, and remote client readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Estimate { service, features, pages, timeline, catalog, json } => {
            commands::estimate::run(commands::estimate::EstimateArgs {
                service,
                features,
                pages,
                timeline,
                catalog,
                json,
            })
        }
        Command::Catalog { catalog } => commands::catalog::run(catalog.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

// Logging is best effort for a CLI: fall back to compact info output when
// the config is absent or invalid instead of refusing to run.
fn init_logging() {
    use tracing::Level;

    let (level, format) = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::INFO),
            config.logging.format,
        ),
        Err(_) => (Level::INFO, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(level);
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
