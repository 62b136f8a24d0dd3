//! `occurrences` CLI - list, validate, and describe meeting occurrences.
//!
//! Reads a meeting snapshot as JSON and runs it through `occurrence-engine`.
//!
//! ## Usage
//!
//! ```sh
//! # First 10 occurrences of a meeting (stdin → stdout)
//! cat meeting.json | occurrences list
//!
//! # Occurrences still relevant at a given instant
//! occurrences list -i meeting.json --from 2024-07-01T00:00:00Z --limit 5
//!
//! # Check that an occurrence ID names a future occurrence
//! occurrences validate -i meeting.json --id 1717750800
//!
//! # One-line summary of the recurrence rule
//! occurrences describe -i meeting.json
//! ```
//!
//! Logs go to stderr. Set `RUST_LOG` or pass `--verbose` for more detail.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use occurrence_engine::{EngineConfig, MeetingBase, OccurrenceEngine};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "occurrences",
    version,
    about = "Expand and validate recurring meeting occurrences"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with engine settings (caps, relevance grace)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List occurrences as a JSON array
    List {
        /// Meeting JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Reference instant (RFC 3339); defaults to the meeting's start time
        #[arg(long, value_parser = parse_instant)]
        from: Option<DateTime<Utc>>,
        /// Maximum number of occurrences
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        limit: i32,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Check that an occurrence ID names a future occurrence
    Validate {
        /// Meeting JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Occurrence ID (Unix epoch seconds of its start)
        #[arg(long)]
        id: String,
        /// How many occurrences from the series start to search
        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        max: i32,
        /// Treat this instant (RFC 3339) as "now"
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,
    },
    /// Print a one-line summary of the meeting's recurrence
    Describe {
        /// Meeting JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let engine = OccurrenceEngine::new(load_config(cli.config.as_deref())?);

    match cli.command {
        Commands::List {
            input,
            output,
            from,
            limit,
            compact,
        } => {
            let meeting = read_meeting(input.as_deref())?;
            let from = from.unwrap_or(meeting.start_time);
            let expansion = engine.expand(&meeting, from, limit);
            if expansion.truncated {
                tracing::warn!(
                    count = expansion.occurrences.len(),
                    "series stopped at the safety cap"
                );
            }
            let json = if compact {
                serde_json::to_string(&expansion.occurrences)?
            } else {
                serde_json::to_string_pretty(&expansion.occurrences)?
            };
            write_output(output.as_deref(), &json)?;
        }
        Commands::Validate {
            input,
            id,
            max,
            now,
        } => {
            let meeting = read_meeting(input.as_deref())?;
            let now = now.unwrap_or_else(Utc::now);
            engine
                .validate_future_occurrence_id_at(Some(&meeting), &id, max, now)
                .with_context(|| format!("Occurrence {} rejected", id))?;
            println!("{}", serde_json::json!({ "valid": true, "occurrence_id": id }));
        }
        Commands::Describe { input } => {
            let meeting = read_meeting(input.as_deref())?;
            match &meeting.recurrence {
                Some(rule) => println!("{}", rule.describe()),
                None => println!("Does not repeat"),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_instant(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            let config = EngineConfig::from_json_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path))?;
            debug!(?config, "loaded engine config");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_meeting(path: Option<&str>) -> Result<MeetingBase> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse meeting JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
