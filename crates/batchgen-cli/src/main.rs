//! Batchgen CLI - Resumable batch generation of images and 3D models.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let result = match cli.command {
        Some(Commands::Run(args)) => commands::run::run(&args.with_config(&config)).map(|_| ()),
        Some(Commands::Status(args)) => commands::status::run(&args, &config),
        Some(Commands::Reset(args)) => commands::reset::run(&args, &config),
        Some(Commands::Generate(args)) => commands::generate::run(&args, &config),
        // Default behavior: run with flattened args
        None => commands::run::run(&cli.run.with_config(&config)).map(|_| ()),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    };

    exit_code.into()
}
