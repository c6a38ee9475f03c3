//! Status command - show persisted progress.

use std::path::PathBuf;

use anyhow::{Context, Result};
use batchgen_adapters::{open_source, JsonProgressStore};
use batchgen_core::{ProgressState, ProgressStore};
use clap::Args;
use serde::Serialize;

use super::run::defaults;
use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Arguments for the status command
#[derive(Args)]
pub struct StatusArgs {
    /// Progress file to inspect
    #[arg(long, value_name = "FILE")]
    pub progress_file: Option<PathBuf>,

    /// Work source to compare against (lists remaining items)
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Print status as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Snapshot of a job's progress.
#[derive(Debug, Serialize)]
struct StatusReport {
    progress_file: PathBuf,
    completed: usize,
    total: usize,
    last_index: i64,
    next_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<Vec<String>>,
}

/// Run the status command.
pub fn run(args: &StatusArgs, config: &AppConfig) -> Result<()> {
    let progress_file = args
        .progress_file
        .clone()
        .or_else(|| config.paths.progress_file.clone())
        .unwrap_or_else(|| PathBuf::from(defaults::PROGRESS_FILE));

    let state = JsonProgressStore::new(&progress_file)
        .load()
        .context("Failed to read progress")?;

    let source = args.source.clone().or_else(|| config.paths.source.clone());
    let remaining = match source {
        Some(path) => Some(remaining_ids(&path, &state)?),
        None => None,
    };

    let report = StatusReport {
        progress_file,
        completed: state.completed_count(),
        total: state.total,
        last_index: state.last_index,
        next_index: state.next_index(),
        remaining,
    };

    if args.json {
        return JsonOutput::stdout().write(&report);
    }

    println!("Progress file: {}", report.progress_file.display());
    println!("Completed:     {}/{}", report.completed, report.total);
    println!("Last index:    {}", report.last_index);
    println!("Next index:    {}", report.next_index);
    if let Some(remaining) = &report.remaining {
        println!("Remaining:     {}", remaining.len());
        for id in remaining {
            println!("  {id}");
        }
    }
    Ok(())
}

/// Ids in the source that are not completed, in source order.
fn remaining_ids(path: &std::path::Path, state: &ProgressState) -> Result<Vec<String>> {
    let items = open_source(path)
        .extract()
        .with_context(|| format!("Failed to read source {}", path.display()))?;

    Ok(items
        .into_iter()
        .filter(|item| !state.is_completed(&item.id))
        .map(|item| item.id)
        .collect())
}
