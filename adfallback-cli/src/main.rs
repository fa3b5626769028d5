//! AdFallback CLI - Command-line interface
//!
//! Validates loader configurations and replays page sessions against the
//! simulated host.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::simulate::SimulateArgs;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "adfallback")]
#[command(version, about = "Related-content ad loading with network fallback", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a loader configuration file
    Validate {
        /// Path to the configuration JSON
        config: PathBuf,
    },

    /// Show the slot sizes requested at a viewport width
    Sizes {
        /// Viewport width in CSS pixels
        #[arg(long)]
        width: u32,
    },

    /// Simulate a page session against an in-memory host
    Simulate(SimulateArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Validate { config } => commands::validate::run(&config),
        Commands::Sizes { width } => commands::sizes::run(width),
        Commands::Simulate(args) => commands::simulate::run(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
