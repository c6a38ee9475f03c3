//! CLI command definitions and handlers.

pub mod backend;
pub mod generate;
pub mod reset;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};

/// Batchgen - resumable batch generation of images and 3D models
#[derive(Parser)]
#[command(name = "batchgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared run arguments (source, batching, backend).
    #[command(flatten)]
    pub run: run::RunArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Process the next batch of items (default)
    Run(run::RunArgs),
    /// Show persisted progress
    Status(status::StatusArgs),
    /// Delete the progress file
    Reset(reset::ResetArgs),
    /// Generate a single artifact from a prompt or image
    Generate(generate::GenerateArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run paused or completed.
    Success = 0,
    /// The run aborted or the command failed.
    Error = 1,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
