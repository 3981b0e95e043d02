//! Screen Health CLI
//!
//! Commands:
//! - score: Print the identity-seeded baseline scores
//! - report: Build dashboard JSON from a store snapshot
//! - validate: Report entries and metric fields the aggregator would discard
//! - config: Print the effective scoring configuration

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use screen_health::normalizer::Normalizer;
use screen_health::pipeline::{parse_snapshot, Assessor};
use screen_health::{
    classify, score_from_identity, ComputeError, DashboardEncoder, RiskDimension, ScoringConfig,
    VERSION,
};

/// Screen Health - screen-time wellness scoring
#[derive(Parser)]
#[command(name = "screen-health")]
#[command(version = VERSION)]
#[command(about = "Score screen-time wellness risk and build dashboard payloads", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the baseline scores for an identity
    Score {
        /// Identity key
        #[arg(long)]
        identity: String,

        /// Scoring configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build dashboard JSON from a store snapshot
    Report {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Identity key of the caller
        #[arg(long)]
        identity: String,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Scoring configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// End of the lookback window (RFC 3339); defaults to the latest entry
        #[arg(long)]
        reference_time: Option<String>,
    },

    /// Report what the aggregator would discard from a snapshot
    Validate {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Scoring configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective scoring configuration
    Config {
        /// Configuration file to load and validate
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ScreenHealthCliError> {
    match cli.command {
        Commands::Score {
            identity,
            config,
            json,
        } => cmd_score(&identity, config.as_deref(), json),

        Commands::Report {
            input,
            identity,
            output,
            output_format,
            config,
            reference_time,
        } => cmd_report(
            &input,
            &identity,
            &output,
            output_format,
            config.as_deref(),
            reference_time.as_deref(),
        ),

        Commands::Validate {
            input,
            config,
            json,
        } => cmd_validate(&input, config.as_deref(), json),

        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn cmd_score(identity: &str, config: Option<&Path>, json: bool) -> Result<(), ScreenHealthCliError> {
    let config = load_config(config)?;
    let scores = score_from_identity(identity);
    let levels = classify(&scores, &config);

    if json {
        let report = serde_json::json!({
            "scores": scores,
            "levels": levels,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Baseline Scores");
        println!("===============");
        for dimension in RiskDimension::ALL {
            let level = dimension.level(&levels);
            println!(
                "{:<22} {:>3}  {}",
                dimension.title(),
                dimension.score(&scores),
                dimension.label(level)
            );
        }
    }

    Ok(())
}

fn cmd_report(
    input: &Path,
    identity: &str,
    output: &Path,
    output_format: OutputFormat,
    config: Option<&Path>,
    reference_time: Option<&str>,
) -> Result<(), ScreenHealthCliError> {
    let config = load_config(config)?;
    let snapshot = parse_snapshot(&read_input(input)?)?;

    let mut assessor = Assessor::new(config);
    if let Some(reference) = reference_time {
        let reference = DateTime::parse_from_rfc3339(reference)
            .map_err(|e| ScreenHealthCliError::ReferenceTime(e.to_string()))?
            .with_timezone(&Utc);
        assessor = assessor.with_reference_time(reference);
    }

    let report = assessor.assess(identity, &snapshot);
    tracing::debug!(
        accepted = report.summary.accepted_entries,
        discarded = report.summary.discarded.discarded_entries(),
        "assessed snapshot"
    );

    let payload = DashboardEncoder::new().encode(&report)?;
    let output_data = match output_format {
        OutputFormat::Json => serde_json::to_string(&payload)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, config: Option<&Path>, json: bool) -> Result<(), ScreenHealthCliError> {
    let config = load_config(config)?;
    let snapshot = parse_snapshot(&read_input(input)?)?;
    let normalized = Normalizer::normalize(
        &snapshot.screen_time,
        snapshot.health_metrics.as_ref(),
        &config,
    );
    let discarded = &normalized.discarded;

    let report = ValidationReport {
        total_entries: snapshot.screen_time.len() + snapshot.unparseable_entries,
        accepted_entries: normalized.entries.len(),
        negative_minutes: discarded.negative_minutes,
        excessive_minutes: discarded.excessive_minutes,
        timestamp_out_of_range: discarded.timestamp_out_of_range,
        unparseable: snapshot.unparseable_entries,
        rejected_metric_fields: discarded.rejected_metric_fields.clone(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total entries:    {}", report.total_entries);
        println!("Accepted entries: {}", report.accepted_entries);
        println!("Negative minutes: {}", report.negative_minutes);
        println!("Over {} minutes: {}", config.max_entry_minutes, report.excessive_minutes);
        println!("Bad timestamps:   {}", report.timestamp_out_of_range);
        println!("Unreadable:       {}", report.unparseable);
        if !report.rejected_metric_fields.is_empty() {
            println!("\nRejected health metric fields:");
            for field in &report.rejected_metric_fields {
                println!("  - {}", field);
            }
        }
    }

    let discarded_entries = discarded.discarded_entries() + report.unparseable;
    if discarded_entries == 0 && discarded.rejected_metric_fields.is_empty() {
        Ok(())
    } else {
        Err(ScreenHealthCliError::ValidationFailed(
            discarded_entries,
            discarded.rejected_metric_fields.len(),
        ))
    }
}

fn cmd_config(config: Option<&Path>) -> Result<(), ScreenHealthCliError> {
    let config = load_config(config)?;
    println!("{}", config.to_json()?);
    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, ScreenHealthCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<ScoringConfig, ScreenHealthCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            ScoringConfig::from_json(&json).map_err(ScreenHealthCliError::Config)
        }
        None => Ok(ScoringConfig::default()),
    }
}

// Error types

#[derive(Debug)]
enum ScreenHealthCliError {
    Io(io::Error),
    Compute(ComputeError),
    Config(ComputeError),
    Json(serde_json::Error),
    ReferenceTime(String),
    ValidationFailed(usize, usize),
}

impl From<io::Error> for ScreenHealthCliError {
    fn from(e: io::Error) -> Self {
        ScreenHealthCliError::Io(e)
    }
}

impl From<ComputeError> for ScreenHealthCliError {
    fn from(e: ComputeError) -> Self {
        ScreenHealthCliError::Compute(e)
    }
}

impl From<serde_json::Error> for ScreenHealthCliError {
    fn from(e: serde_json::Error) -> Self {
        ScreenHealthCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ScreenHealthCliError> for CliError {
    fn from(e: ScreenHealthCliError) -> Self {
        match e {
            ScreenHealthCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ScreenHealthCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Input must be a store snapshot with camelCase fields".to_string()),
            },
            ScreenHealthCliError::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'screen-health config' to see the defaults".to_string()),
            },
            ScreenHealthCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ScreenHealthCliError::ReferenceTime(msg) => CliError {
                code: "REFERENCE_TIME_ERROR".to_string(),
                message: msg,
                hint: Some("Use RFC 3339, e.g. 2024-01-15T23:00:00Z".to_string()),
            },
            ScreenHealthCliError::ValidationFailed(entries, fields) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!(
                    "{} entries and {} health metric fields would be discarded",
                    entries, fields
                ),
                hint: Some("Fix the flagged records in the store and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_entries: usize,
    accepted_entries: usize,
    negative_minutes: usize,
    excessive_minutes: usize,
    timestamp_out_of_range: usize,
    unparseable: usize,
    rejected_metric_fields: Vec<String>,
}
