//! Headless replay analyzer.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a replay, text report on stdout
//! cargo run -p sentinel_headless -- analyze --replay match.bin
//!
//! # JSON report written to a file
//! cargo run -p sentinel_headless -- analyze --replay match.json --format json --output report.json
//!
//! # Dump the default configuration to start tuning from
//! cargo run -p sentinel_headless -- config > tuning.ron
//! ```
//!
//! Reports go to stdout (or `--output`), logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_core::config::AnalysisConfig;
use sentinel_headless::{analyze_file, load_config, JsonReporter, TextReporter};

#[derive(Parser)]
#[command(name = "sentinel_headless")]
#[command(about = "Replay statistics and cheat scoring for shooter matches")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a replay file
    Analyze {
        /// Replay file (.bin, .json or .ron)
        #[arg(short, long)]
        replay: PathBuf,

        /// RON configuration overriding the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include raw counters in the text report
        #[arg(long)]
        show_internal: bool,
    },

    /// Print the default configuration as RON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs on stderr so reports can be piped
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let outcome = match cli.command {
        Commands::Analyze {
            replay,
            config,
            format,
            output,
            show_internal,
        } => cmd_analyze(replay, config, format, output, show_internal),
        Commands::Config => cmd_config(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Analyze one replay and emit the report
fn cmd_analyze(
    replay: PathBuf,
    config: Option<PathBuf>,
    format: Format,
    output: Option<PathBuf>,
    show_internal: bool,
) -> Result<(), String> {
    let config = match config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            load_config(&path).map_err(|e| e.to_string())?
        }
        None => AnalysisConfig::default(),
    };

    tracing::info!("Analyzing {}", replay.display());
    let results = analyze_file(&replay, &config).map_err(|e| e.to_string())?;

    let report = match format {
        Format::Text => TextReporter {
            scoring: config.scoring,
            show_internal,
        }
        .render(&results),
        Format::Json => JsonReporter::render(&results).map_err(|e| e.to_string())?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, report)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}

/// Print the default configuration
fn cmd_config() -> Result<(), String> {
    let ron = AnalysisConfig::default()
        .to_ron_string()
        .map_err(|e| e.to_string())?;
    println!("{ron}");
    Ok(())
}
