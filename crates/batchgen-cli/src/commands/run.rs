//! Run command - process the next batch of work items.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use batchgen_adapters::{open_source, JsonProgressStore};
use batchgen_core::{BatchRunner, ResumeStrategy, RunOptions, RunOutcome, RunReport};
use clap::{Args, ValueEnum};
use tracing::info;

use super::backend::{self, GeneratorArgs};
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressReporter};

/// Hardcoded default values.
pub mod defaults {
    pub const SOURCE: &str = "randomitems.js";
    pub const OUTPUT_DIR: &str = "randomitems_icons";
    pub const PROGRESS_FILE: &str = "icon_progress_tracker.json";
    pub const BATCH_SIZE: usize = 10;
    pub const DELAY_SECS: f64 = 2.0;
    pub const TEST_MODE_CAP: usize = 3;
}

/// How the resume point is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResumeArg {
    /// Continue after the last attempted index
    Index,
    /// Start over and skip every completed item
    Identity,
}

impl From<ResumeArg> for ResumeStrategy {
    fn from(arg: ResumeArg) -> Self {
        match arg {
            ResumeArg::Index => Self::LastIndex,
            ResumeArg::Identity => Self::Identity,
        }
    }
}

/// Parse and validate a batch size (at least 1).
fn parse_batch_size(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid count"))?;
    if value == 0 {
        Err("batch size must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Parse and validate a delay in seconds.
fn parse_delay(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    match Duration::try_from_secs_f64(value) {
        Ok(_) => Ok(value),
        Err(_) if value < 0.0 || !value.is_finite() => {
            Err(format!("{value} is not a non-negative number of seconds"))
        }
        Err(_) => Err(format!("{value} seconds is too long a delay")),
    }
}

/// Shared arguments for a batch run.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Work source: JS or JSON item catalog, or a folder of images
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Directory artifacts are written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Progress file used to resume between runs
    #[arg(long, value_name = "FILE")]
    pub progress_file: Option<PathBuf>,

    /// Items to attempt before pausing
    #[arg(long, value_name = "N", value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Seconds to wait between requests
    #[arg(long, value_name = "SECONDS", value_parser = parse_delay)]
    pub delay: Option<f64>,

    /// Discard previous progress and start from the first item
    #[arg(long)]
    pub force_restart: bool,

    /// Only process the first few items
    #[arg(long)]
    pub test_mode: bool,

    /// Start at this index regardless of saved progress
    #[arg(long, value_name = "N")]
    pub skip_first: Option<usize>,

    /// Resume strategy
    #[arg(long, value_enum)]
    pub resume: Option<ResumeArg>,

    /// Record items whose artifact already exists as completed
    #[arg(long)]
    pub skip_existing: bool,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl RunArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.source.is_none() {
            self.source.clone_from(&config.paths.source);
        }
        if self.output_dir.is_none() {
            self.output_dir.clone_from(&config.paths.output_dir);
        }
        if self.progress_file.is_none() {
            self.progress_file.clone_from(&config.paths.progress_file);
        }

        self.batch_size = self.batch_size.or(config.run.batch_size);
        self.delay = self.delay.or(config.run.delay);

        if self.resume.is_none() {
            self.resume = config
                .run
                .resume
                .as_deref()
                .and_then(|name| ResumeArg::from_str(name, true).ok());
        }
        if !self.skip_existing {
            self.skip_existing = config.run.skip_existing.unwrap_or(false);
        }
        if !self.progress {
            self.progress = config.output.progress.unwrap_or(false);
        }

        self.generator = self.generator.with_config(config);
        self.config = Some(config.clone());
        self
    }

    fn source(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::SOURCE))
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_DIR))
    }

    fn progress_file(&self) -> PathBuf {
        self.progress_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::PROGRESS_FILE))
    }

    fn test_mode_cap(&self) -> usize {
        self.config
            .as_ref()
            .and_then(|c| c.run.test_mode_cap)
            .unwrap_or(defaults::TEST_MODE_CAP)
    }

    fn delay(&self) -> Duration {
        self.delay
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_else(|| Duration::from_secs_f64(defaults::DELAY_SECS))
    }

    /// Runner options from the merged arguments.
    pub fn run_options(&self) -> RunOptions {
        let config = self.config.clone().unwrap_or_default();
        RunOptions {
            batch_size: self.batch_size.unwrap_or(defaults::BATCH_SIZE),
            delay: self.delay(),
            force_restart: self.force_restart,
            test_mode: self.test_mode,
            test_mode_cap: self.test_mode_cap(),
            skip_first: self.skip_first,
            resume: self.resume.map(ResumeStrategy::from).unwrap_or_default(),
            skip_existing: self.skip_existing,
            output_dir: self.output_dir(),
            variant: self.generator.variant(),
            params: backend::generation_params(&config),
        }
    }
}

/// Run the batch.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &RunArgs) -> Result<RunReport> {
    let source_path = args.source();
    info!("Running batch from {}", source_path.display());

    let config = args.config.clone().unwrap_or_default();
    let source = open_source(&source_path);
    let store = JsonProgressStore::new(args.progress_file());
    let generator = backend::build_generator(&args.generator, &config)?;

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let reporter = ProgressReporter::new(args.quiet, show_progress);

    let report = BatchRunner::new(
        source.as_ref(),
        &store,
        &generator,
        &reporter,
        args.run_options(),
    )
    .run()
    .with_context(|| format!("Batch from {} aborted", source.describe()))?;

    for line in summary_lines(&report) {
        eprintln!("{line}");
    }

    if args.json {
        JsonOutput::stdout().write(&report)?;
    }

    Ok(report)
}

/// End-of-run summary for the operator.
fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} succeeded, {} failed, {} skipped; {}/{} items completed",
        report.succeeded, report.failed, report.skipped, report.completed, report.total
    )];

    if report.persistence_failures > 0 {
        lines.push(format!(
            "warning: {} progress save(s) failed during this run",
            report.persistence_failures
        ));
    }

    match report.outcome {
        RunOutcome::Paused { next_index } => {
            lines.push(format!(
                "Completed batch of {} items. Pausing at item {}.",
                report.attempted,
                next_index + 1
            ));
            lines.push("To continue, run the command again.".to_string());
            lines.push("To start over, use --force-restart".to_string());
        }
        RunOutcome::Completed { all_done: true } => {
            lines.push("All items have been generated successfully!".to_string());
        }
        RunOutcome::Completed { all_done: false } if !report.test_mode => {
            lines.push(format!(
                "Processed {}/{} items.",
                report.completed, report.total
            ));
            lines.push("Run again to continue processing remaining items.".to_string());
        }
        RunOutcome::Completed { all_done: false } => {}
    }

    if let Some(skip) = report.resume_hint() {
        lines.push("Test completed! To process all items, run without --test-mode.".to_string());
        lines.push(format!(
            "To skip the {skip} items you just processed, use --skip-first {skip}"
        ));
    }

    lines
}
