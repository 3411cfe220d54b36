//! Gluco CLI - command-line front end for the analytics engine
//!
//! Commands:
//! - report: full daily report (RoC stats, TIR, AGP, hourly IOB) as JSON
//! - roc: rate-of-change points and rollup stats
//! - agp: 288-slot ambulatory glucose profile
//! - iob: hourly insulin-on-board series for a date

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use gluco_analytics::parser::{parse_insulin_readings_auto, parse_readings_auto};
use gluco_analytics::roc::{calculate_roc, calculate_roc_stats, calculate_roc_with_interval, smooth_roc_data};
use gluco_analytics::{
    agp, iob, AnalyticsError, GlucoseThresholds, ReportConfig, ReportEncoder, ENGINE_VERSION,
};

/// Gluco - analytics for exported CGM and insulin-delivery data
#[derive(Parser)]
#[command(name = "gluco")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze CGM export files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a full daily report as JSON
    Report {
        /// CGM export file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Separate insulin export file; defaults to parsing insulin rows
        /// from the same input
        #[arg(long)]
        insulin_input: Option<PathBuf>,

        /// Report date (YYYY-MM-DD), drives the IOB series
        #[arg(short, long)]
        date: String,

        /// Insulin action duration in hours (1-10)
        #[arg(long, default_value_t = iob::DEFAULT_ACTION_HOURS)]
        insulin_duration: u32,

        /// Very-low threshold (mmol/L)
        #[arg(long, default_value_t = 3.0)]
        very_low: f64,

        /// Low threshold (mmol/L)
        #[arg(long, default_value_t = 3.9)]
        low: f64,

        /// High threshold (mmol/L)
        #[arg(long, default_value_t = 10.0)]
        high: f64,

        /// Very-high threshold (mmol/L)
        #[arg(long, default_value_t = 13.9)]
        very_high: f64,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Compute rate-of-change points and rollup statistics
    Roc {
        /// CGM export file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Look-back interval in minutes instead of consecutive pairs
        /// (e.g. 30, 60, 120)
        #[arg(long)]
        interval: Option<f64>,

        /// Apply the 15-minute centered moving-average smoother
        #[arg(long)]
        smooth: bool,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Compute the 288-slot ambulatory glucose profile
    Agp {
        /// CGM export file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Compute the hourly insulin-on-board series for a date
    Iob {
        /// Insulin export file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Insulin action duration in hours (1-10)
        #[arg(long, default_value_t = iob::DEFAULT_ACTION_HOURS)]
        insulin_duration: u32,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
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

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), GlucoCliError> {
    match cli.command {
        Commands::Report {
            input,
            insulin_input,
            date,
            insulin_duration,
            very_low,
            low,
            high,
            very_high,
            format,
        } => {
            let csv_text = read_input(&input)?;
            let readings = parse_readings_auto(&csv_text);
            let insulin = match insulin_input {
                Some(path) => parse_insulin_readings_auto(&read_input(&path)?),
                None => parse_insulin_readings_auto(&csv_text),
            };

            let config = ReportConfig {
                thresholds: GlucoseThresholds {
                    very_low,
                    low,
                    high,
                    very_high,
                },
                insulin_action_hours: insulin_duration,
            };

            let encoder = ReportEncoder::new();
            let report = encoder.encode(&readings, &insulin, &date, &config)?;
            print_json(&report, &format)
        }

        Commands::Roc {
            input,
            interval,
            smooth,
            format,
        } => {
            let readings = parse_readings_auto(&read_input(&input)?);
            let mut points = match interval {
                Some(minutes) => calculate_roc_with_interval(&readings, minutes),
                None => calculate_roc(&readings),
            };
            if smooth {
                points = smooth_roc_data(&points);
            }
            let stats = calculate_roc_stats(&points);
            print_json(&serde_json::json!({ "points": points, "stats": stats }), &format)
        }

        Commands::Agp { input, format } => {
            let readings = parse_readings_auto(&read_input(&input)?);
            let slots = agp::calculate_agp_stats(&readings);
            print_json(&slots, &format)
        }

        Commands::Iob {
            input,
            date,
            insulin_duration,
            format,
        } => {
            let events = parse_insulin_readings_auto(&read_input(&input)?);
            let series = iob::prepare_hourly_iob_for_date(&events, &date, insulin_duration)?;
            print_json(&series, &format)
        }
    }
}

fn read_input(path: &PathBuf) -> Result<String, GlucoCliError> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("gluco: reading export data from terminal (pipe a file or press Ctrl-D)");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn print_json<T: serde::Serialize>(value: &T, format: &OutputFormat) -> Result<(), GlucoCliError> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{output}");
    Ok(())
}

// Error types

#[derive(Debug)]
enum GlucoCliError {
    Io(io::Error),
    Analytics(AnalyticsError),
    Json(serde_json::Error),
}

impl From<io::Error> for GlucoCliError {
    fn from(e: io::Error) -> Self {
        GlucoCliError::Io(e)
    }
}

impl From<AnalyticsError> for GlucoCliError {
    fn from(e: AnalyticsError) -> Self {
        GlucoCliError::Analytics(e)
    }
}

impl From<serde_json::Error> for GlucoCliError {
    fn from(e: serde_json::Error) -> Self {
        GlucoCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GlucoCliError> for CliError {
    fn from(e: GlucoCliError) -> Self {
        match e {
            GlucoCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GlucoCliError::Analytics(e) => CliError {
                code: "ANALYTICS_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check thresholds, insulin duration, and the report date".to_string()),
            },
            GlucoCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
        }
    }
}
