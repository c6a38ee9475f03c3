//! Reset command - discard persisted progress.

use std::path::PathBuf;

use anyhow::{Context, Result};
use batchgen_adapters::JsonProgressStore;
use batchgen_core::ProgressStore;
use clap::Args;

use super::run::defaults;
use crate::config::AppConfig;

/// Arguments for the reset command
#[derive(Args)]
pub struct ResetArgs {
    /// Progress file to delete
    #[arg(long, value_name = "FILE")]
    pub progress_file: Option<PathBuf>,
}

/// Run the reset command.
pub fn run(args: &ResetArgs, config: &AppConfig) -> Result<()> {
    let path = args
        .progress_file
        .clone()
        .or_else(|| config.paths.progress_file.clone())
        .unwrap_or_else(|| PathBuf::from(defaults::PROGRESS_FILE));

    let existed = path.exists();
    JsonProgressStore::new(&path)
        .reset()
        .context("Failed to reset progress")?;

    if existed {
        eprintln!("Removed {}", path.display());
    } else {
        eprintln!("No progress file at {}", path.display());
    }
    Ok(())
}
