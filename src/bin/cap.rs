//! CAP CLI - Command-line interface for CAP core
//!
//! Commands:
//! - score: Score one set of measurements and print the report
//! - batch: Score newline-delimited measurements (one report per line)
//! - policy: Print the effective scoring and nudge policy

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cap_core::types::AlignmentReport;
use cap_core::{parse_measurements, AlignmentProcessor, ComputeError, Policy, RawMeasurements};
use cap_core::{CAP_VERSION, PRODUCER_NAME};

/// CAP - misalignment scoring and behavioral nudges
#[derive(Parser)]
#[command(name = "cap")]
#[command(version = CAP_VERSION)]
#[command(about = "Score behavioral measurements and generate nudges", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one set of measurements
    Score {
        /// Measurements JSON file (use - for stdin); flags below override its fields
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Hours spent indoors today
        #[arg(long)]
        indoor_hours: Option<f64>,

        /// Minutes spent in nature this week
        #[arg(long)]
        nature_minutes: Option<f64>,

        /// App switches per minute
        #[arg(long)]
        switches_per_minute: Option<f64>,

        /// Late-night screen minutes
        #[arg(long)]
        late_night_minutes: Option<f64>,

        /// In-person social proximity events in the last 24h
        #[arg(long)]
        social_events: Option<f64>,

        /// Policy file (TOML, or JSON with a .json extension)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Score newline-delimited measurements (batch mode)
    Batch {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Policy file (TOML, or JSON with a .json extension)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Print the effective policy
    Policy {
        /// Policy file to load and validate (defaults are printed otherwise)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

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

fn run(cli: Cli) -> Result<(), CapCliError> {
    match cli.command {
        Commands::Score {
            input,
            indoor_hours,
            nature_minutes,
            switches_per_minute,
            late_night_minutes,
            social_events,
            policy,
            output_format,
        } => {
            let overrides = MeasurementOverrides {
                indoor_hours,
                nature_minutes,
                switches_per_minute,
                late_night_minutes,
                social_events,
            };
            cmd_score(input.as_deref(), overrides, policy.as_deref(), output_format)
        }

        Commands::Batch {
            input,
            output,
            policy,
            flush,
        } => cmd_batch(&input, &output, policy.as_deref(), flush),

        Commands::Policy { policy, json } => cmd_policy(policy.as_deref(), json),
    }
}

struct MeasurementOverrides {
    indoor_hours: Option<f64>,
    nature_minutes: Option<f64>,
    switches_per_minute: Option<f64>,
    late_night_minutes: Option<f64>,
    social_events: Option<f64>,
}

impl MeasurementOverrides {
    fn apply(&self, measurements: &mut RawMeasurements) {
        if let Some(v) = self.indoor_hours {
            measurements.indoor_hours = v;
        }
        if let Some(v) = self.nature_minutes {
            measurements.nature_minutes_this_week = v;
        }
        if let Some(v) = self.switches_per_minute {
            measurements.screen_switches_per_minute = v;
        }
        if let Some(v) = self.late_night_minutes {
            measurements.late_night_screen_minutes = v;
        }
        if let Some(v) = self.social_events {
            measurements.social_proximity_events = v;
        }
    }
}

fn cmd_score(
    input: Option<&Path>,
    overrides: MeasurementOverrides,
    policy: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), CapCliError> {
    let processor = load_processor(policy)?;

    let mut measurements = match input {
        Some(path) => parse_measurements(&read_input(path)?)?,
        None => RawMeasurements::default(),
    };
    overrides.apply(&mut measurements);

    let report = processor.report(&measurements);

    match output_format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    policy: Option<&Path>,
    flush: bool,
) -> Result<(), CapCliError> {
    let processor = load_processor(policy)?;

    let reader: Box<dyn BufRead> = if is_stdio(input) {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading measurements from an interactive terminal; end input with Ctrl-D");
        }
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(fs::File::open(input)?))
    };

    let mut writer: Box<dyn Write> = if is_stdio(output) {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(output)?)
    };

    let mut processed = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let measurements = parse_measurements(trimmed).map_err(|e| CapCliError::Line {
            line: index + 1,
            source: e,
        })?;
        let report = processor.report(&measurements);

        writeln!(writer, "{}", serde_json::to_string(&report)?)?;
        if flush {
            writer.flush()?;
        }
        processed += 1;
    }
    writer.flush()?;

    if processed == 0 {
        return Err(CapCliError::NoRecords);
    }

    info!(records = processed, "batch complete");
    Ok(())
}

fn cmd_policy(policy: Option<&Path>, json: bool) -> Result<(), CapCliError> {
    let policy = match policy {
        Some(path) => load_policy(path)?,
        None => Policy::default(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&policy)?);
    } else {
        print!("{}", policy.to_toml()?);
    }

    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(path: &Path) -> Result<String, CapCliError> {
    if is_stdio(path) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn load_policy(path: &Path) -> Result<Policy, CapCliError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    debug!(path = %path.display(), is_json, "loading policy");

    let policy = if is_json {
        Policy::from_json(&content)?
    } else {
        Policy::from_toml(&content)?
    };
    Ok(policy)
}

fn load_processor(policy: Option<&Path>) -> Result<AlignmentProcessor, CapCliError> {
    match policy {
        Some(path) => Ok(AlignmentProcessor::with_policy(load_policy(path)?)?),
        None => Ok(AlignmentProcessor::new()),
    }
}

fn render_text(report: &AlignmentReport) -> String {
    let mut out = String::new();
    let score = &report.score;

    out.push_str(&format!(
        "Misalignment Index: {} ({})\n",
        score.composite, score.verdict
    ));
    out.push_str("Breakdown:\n");
    for (dimension, value) in score.components.iter() {
        out.push_str(&format!("  {:<10} {:>3}\n", dimension.name(), value));
    }

    out.push_str(&format!("\n{} nudge(s):\n", report.nudges.len()));
    for (i, nudge) in report.nudges.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. [Priority {}] {}\n   {}\n   -> {}\n",
            i + 1,
            nudge.priority,
            nudge.title,
            nudge.body,
            nudge.suggestion
        ));
        if let Some(value) = nudge.value_usd {
            out.push_str(&format!("   Recovery value: ${value:.2}\n"));
        }
    }

    if report.total_value_usd != 0.0 {
        out.push_str(&format!(
            "\nTotal recovery value: ${:.2}\n",
            report.total_value_usd
        ));
    }

    out
}

// Error types

#[derive(Debug)]
enum CapCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Line { line: usize, source: ComputeError },
    NoRecords,
}

impl From<io::Error> for CapCliError {
    fn from(e: io::Error) -> Self {
        CapCliError::Io(e)
    }
}

impl From<ComputeError> for CapCliError {
    fn from(e: ComputeError) -> Self {
        CapCliError::Compute(e)
    }
}

impl From<serde_json::Error> for CapCliError {
    fn from(e: serde_json::Error) -> Self {
        CapCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
    producer: String,
}

impl CliError {
    fn new(code: &str, message: String, hint: &str) -> Self {
        CliError {
            code: code.to_string(),
            message,
            hint: Some(hint.to_string()),
            producer: PRODUCER_NAME.to_string(),
        }
    }
}

impl From<CapCliError> for CliError {
    fn from(e: CapCliError) -> Self {
        match e {
            CapCliError::Io(e) => {
                CliError::new("IO_ERROR", e.to_string(), "Check file paths and permissions")
            }
            CapCliError::Compute(e @ ComputeError::InvalidInput(_)) => CliError::new(
                "INVALID_INPUT",
                e.to_string(),
                "Measurements must be a JSON object of numeric fields",
            ),
            CapCliError::Compute(
                e @ (ComputeError::InvalidPolicy(_) | ComputeError::PolicyParse(_)),
            ) => CliError::new(
                "POLICY_ERROR",
                e.to_string(),
                "Run 'cap policy' to see the expected layout",
            ),
            CapCliError::Compute(e) => {
                CliError::new("COMPUTE_ERROR", e.to_string(), "Check input and policy")
            }
            CapCliError::Json(e) => CliError::new("JSON_ERROR", e.to_string(), "Check JSON syntax"),
            CapCliError::Line { line, source } => CliError::new(
                "INVALID_INPUT",
                format!("line {line}: {source}"),
                "Each line must be one measurements JSON object",
            ),
            CapCliError::NoRecords => CliError::new(
                "NO_RECORDS",
                "No measurements found in input".to_string(),
                "Ensure input file is not empty",
            ),
        }
    }
}
