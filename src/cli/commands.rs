//! CLI command definitions for sessioncheck.
//!
//! Validates raw session directories against the naming convention and
//! prints the files that would be ingested.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ValidatorConfig;
use crate::validation::{
    validate_session_path, validate_subject_dir, SessionFiles, SessionOutcome, SessionReport,
    SessionValidator,
};

/// Default configuration file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "sessioncheck.yaml";

/// Validate raw experimental session directories before upload.
#[derive(Parser)]
#[command(name = "sessioncheck")]
#[command(about = "Validate raw behavioral, ephys and video session directories")]
#[command(version)]
#[command(
    long_about = "sessioncheck checks that raw session directories follow the naming convention for PyControl, SpikeGLX and camera data.\n\nExample usage:\n  sessioncheck validate /data/raw/M016/M016_2023_08_15_16_00 --subject M016\n  sessioncheck validate-subject /data/raw/M016 --json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Validate a single session directory.
    Validate(ValidateArgs),

    /// Validate every session directory of a subject.
    #[command(name = "validate-subject")]
    ValidateSubject(ValidateSubjectArgs),

    /// Check only the session folder name.
    #[command(name = "check-name")]
    CheckName(CheckNameArgs),
}

/// Switches shared by the validating commands.
#[derive(clap::Args, Debug, Clone)]
pub struct StreamArgs {
    /// YAML configuration file (defaults to ./sessioncheck.yaml if present).
    #[arg(short, long, env = "SESSIONCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip behavioral data.
    #[arg(long)]
    pub no_behavior: bool,

    /// Skip ephys data.
    #[arg(long)]
    pub no_ephys: bool,

    /// Skip videos.
    #[arg(long)]
    pub no_videos: bool,

    /// Output JSON to stdout instead of a summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `sessioncheck validate`.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the session directory.
    pub session_path: PathBuf,

    /// Subject name the session folder has to start with.
    #[arg(short, long)]
    pub subject: String,

    #[command(flatten)]
    pub streams: StreamArgs,
}

/// Arguments for `sessioncheck validate-subject`.
#[derive(Parser, Debug)]
pub struct ValidateSubjectArgs {
    /// Directory holding the subject's session directories.
    pub subject_dir: PathBuf,

    /// Subject name (defaults to the directory name).
    #[arg(short, long)]
    pub subject: Option<String>,

    #[command(flatten)]
    pub streams: StreamArgs,
}

/// Arguments for `sessioncheck check-name`.
#[derive(Parser, Debug)]
pub struct CheckNameArgs {
    /// Path to the session directory.
    pub session_path: PathBuf,

    /// Subject name the session folder has to start with.
    #[arg(short, long)]
    pub subject: String,
}

/// Parses the command line without running anything.
///
/// The binary needs `--log-level` before the subscriber exists, so parsing and
/// dispatch are separate steps.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate(args) => run_validate_command(args),
        Commands::ValidateSubject(args) => run_validate_subject_command(args),
        Commands::CheckName(args) => run_check_name_command(args),
    }
}

/// Builds the validator configuration from the config file and CLI switches.
fn load_config(args: &StreamArgs) -> anyhow::Result<ValidatorConfig> {
    let config = match &args.config {
        Some(path) => ValidatorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            debug!("Using {}", DEFAULT_CONFIG_FILE);
            ValidatorConfig::load_from_file(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("Failed to load config: {}", DEFAULT_CONFIG_FILE))?
        }
        None => ValidatorConfig::default(),
    };

    Ok(apply_stream_switches(config, args))
}

fn apply_stream_switches(config: ValidatorConfig, args: &StreamArgs) -> ValidatorConfig {
    let include_behavior = config.include_behavior && !args.no_behavior;
    let include_ephys = config.include_ephys && !args.no_ephys;
    let include_videos = config.include_videos && !args.no_videos;
    config
        .with_behavior(include_behavior)
        .with_ephys(include_ephys)
        .with_videos(include_videos)
}

fn run_validate_command(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.streams)?;
    let validator = SessionValidator::new(config);

    let files = validator
        .validate(&args.session_path, &args.subject)
        .with_context(|| format!("Session {} is invalid", args.session_path.display()))?;

    if args.streams.json {
        let json_output = serde_json::to_string_pretty(&files)?;
        println!("{}", json_output);
    } else {
        print_session_summary(&args.session_path, &files);
    }
    Ok(())
}

fn run_validate_subject_command(args: ValidateSubjectArgs) -> anyhow::Result<()> {
    let subject = match &args.subject {
        Some(subject) => subject.clone(),
        None => args
            .subject_dir
            .canonicalize()
            .with_context(|| format!("Cannot resolve {}", args.subject_dir.display()))?
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Cannot derive subject name from directory; pass --subject")?,
    };
    info!("Validating sessions of subject {}", subject);

    let config = load_config(&args.streams)?;
    let validator = SessionValidator::new(config);
    let reports = validate_subject_dir(&args.subject_dir, &subject, &validator)
        .with_context(|| format!("Failed to read {}", args.subject_dir.display()))?;

    let summary = BatchSummary::from_reports(&subject, &reports);
    if args.streams.json {
        let json_output = serde_json::to_string_pretty(&BatchOutput {
            summary: &summary,
            sessions: &reports,
        })?;
        println!("{}", json_output);
    } else {
        print_batch_summary(&summary, &reports);
    }

    if summary.failed > 0 {
        anyhow::bail!("{} of {} sessions failed validation", summary.failed, summary.total);
    }
    Ok(())
}

fn run_check_name_command(args: CheckNameArgs) -> anyhow::Result<()> {
    let session = validate_session_path(&args.session_path, &args.subject)
        .with_context(|| format!("Invalid session path {}", args.session_path.display()))?;
    println!(
        "✓ {} (subject {}, recorded {})",
        session.name(),
        session.subject(),
        session.date().format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

/// Counts over a batch of session reports.
#[derive(Debug, Serialize)]
struct BatchSummary {
    subject: String,
    total: usize,
    passed: usize,
    failed: usize,
}

impl BatchSummary {
    fn from_reports(subject: &str, reports: &[SessionReport]) -> Self {
        let passed = reports.iter().filter(|r| r.passed()).count();
        Self {
            subject: subject.to_string(),
            total: reports.len(),
            passed,
            failed: reports.len() - passed,
        }
    }
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    summary: &'a BatchSummary,
    sessions: &'a [SessionReport],
}

fn print_session_summary(session_path: &Path, files: &SessionFiles) {
    println!("✓ {} is valid", session_path.display());
    println!("  Behavior files: {}", files.behavior.len());
    println!("  Ephys files:    {}", files.ephys.len());
    println!("  Video files:    {}", files.video.len());
    for advisory in &files.advisories {
        println!("  ! {}", advisory.message);
    }
}

fn print_batch_summary(summary: &BatchSummary, reports: &[SessionReport]) {
    println!("\n=== Sessions of {} ===", summary.subject);
    for report in reports {
        match &report.outcome {
            SessionOutcome::Passed { files } => {
                println!(
                    "  ✓ {} ({} files, {} advisories)",
                    report.session.display(),
                    files.file_count(),
                    files.advisories.len()
                );
            }
            SessionOutcome::Failed { message, .. } => {
                println!("  ✗ {}", report.session.display());
                println!("    error: {message}");
            }
        }
    }
    println!();
    println!("Total:  {}", summary.total);
    println!("Passed: {}", summary.passed);
    println!("Failed: {}", summary.failed);
}
