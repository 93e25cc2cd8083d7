pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use scopewise_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "scopewise",
    about = "Scopewise staffing-hour pricing CLI",
    long_about = "Price staffing scenarios against the tier and rate catalogs, classify margins for approval, and export proposal snapshots.",
    after_help = "Examples:\n  scopewise catalog\n  scopewise price --scenario acme.toml\n  scopewise classify 0.27\n  scopewise export --scenario acme.toml --out-dir exports"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Print the services, tiers, rate table, and approval floors in effect")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Price a scenario file and print the proposal summary")]
    Price {
        #[arg(long, help = "Path to a TOML or JSON scenario file")]
        scenario: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Include the step-by-step pricing trace for each row")]
        trace: bool,
    },
    #[command(about = "Print the approval tier for a margin ratio such as 0.25")]
    Classify {
        #[arg(allow_hyphen_values = true)]
        margin: String,
    },
    #[command(about = "Write a pricing_scope_<date>.json snapshot for a scenario")]
    Export {
        #[arg(long, help = "Path to a TOML or JSON scenario file")]
        scenario: PathBuf,
        #[arg(long, help = "Directory for the snapshot (defaults to export.output_dir)")]
        out_dir: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, rate table completeness, tiers, and approval floors")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // A broken config still gets default logging; the command reports the error itself.
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    if let Err(error) = init_logging(&logging) {
        eprintln!("{error:#}");
    }

    let result = match cli.command {
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Price { scenario, json, trace } => commands::price::run(&scenario, json, trace),
        Command::Classify { margin } => commands::classify::run(&margin),
        Command::Export { scenario, out_dir } => commands::export::run(&scenario, out_dir),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable.
pub fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(log_filter(logging))
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

/// Filter at `logging.level`; anything that is not a level name falls back to info.
pub fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    let level = logging.level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    EnvFilter::default().add_directive(level.into())
}
