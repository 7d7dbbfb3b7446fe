//! Pulse CLI - Command-line interface for Recovery Pulse
//!
//! Commands:
//! - predict: Full relapse-risk prediction
//! - daily: Condensed daily risk assessment
//! - patterns: Week-over-week pattern detection
//! - correlations: Metric-pair correlation analysis
//! - trends: Short-horizon metric projections

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use recovery_pulse::types::EventHistory;
use recovery_pulse::{EngineError, RiskEngine, ENGINE_VERSION};

/// Pulse - behavioral relapse-risk reports from a recovery event log
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze recovery events into relapse-risk reports", long_about = None)]
struct Cli {
    /// Event log JSON file (use - for stdin)
    #[arg(short, long, global = true, default_value = "-")]
    input: PathBuf,

    /// Reference timestamp for window calculations (RFC 3339, defaults to now)
    #[arg(long, global = true)]
    as_of: Option<String>,

    /// Output format (defaults to pretty JSON on a terminal)
    #[arg(long, global = true)]
    output_format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full relapse-risk prediction
    Predict,
    /// Condensed daily risk assessment
    Daily,
    /// Week-over-week pattern detection
    Patterns,
    /// Metric-pair correlation analysis
    Correlations,
    /// Short-horizon metric projections
    Trends,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Serialize)]
struct CliError {
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = CliError {
                error: e.to_string(),
            };
            eprintln!(
                "{}",
                serde_json::to_string(&report).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EngineError> {
    let events = read_events(&cli.input)?;
    let now = parse_reference_time(cli.as_of.as_deref())?;
    let format = cli.output_format.unwrap_or_else(default_format);

    let engine = RiskEngine::new();
    let output = match cli.command {
        Commands::Predict => to_output(&engine.predict_risk(&events, now), format)?,
        Commands::Daily => to_output(&engine.daily_risk_assessment(&events, now), format)?,
        Commands::Patterns => to_output(&engine.detect_patterns(&events, now), format)?,
        Commands::Correlations => to_output(&engine.analyze_correlations(&events, now), format)?,
        Commands::Trends => to_output(&engine.generate_predictions(&events, now), format)?,
    };

    println!("{output}");
    Ok(())
}

fn read_events(input: &PathBuf) -> Result<EventHistory, EngineError> {
    let raw = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| EngineError::ParseError(format!("failed to read stdin: {e}")))?;
        buffer
    } else {
        fs::read_to_string(input)
            .map_err(|e| EngineError::ParseError(format!("failed to read {}: {e}", input.display())))?
    };

    EventHistory::from_json(&raw)
}

fn parse_reference_time(as_of: Option<&str>) -> Result<DateTime<Utc>, EngineError> {
    match as_of {
        Some(raw) => raw
            .parse::<DateTime<Utc>>()
            .map_err(|e| EngineError::DateParseError(format!("{raw}: {e}"))),
        None => Ok(Utc::now()),
    }
}

fn default_format() -> OutputFormat {
    if atty::is(atty::Stream::Stdout) {
        OutputFormat::JsonPretty
    } else {
        OutputFormat::Json
    }
}

fn to_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, EngineError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    Ok(rendered)
}
