//! # hazcurve CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hazcurve_cli::build::{run_build, BuildArgs};
use hazcurve_cli::combine::{run_combine, CombineArgs};
use hazcurve_cli::export::{run_export, ExportArgs};
use hazcurve_cli::inspect::{run_inspect, InspectArgs};

/// hazcurve: seismic hazard probability maps.
///
/// Builds, inspects, combines and exports probability-map archives.
#[derive(Parser, Debug)]
#[command(name = "hazcurve", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the YAML calculation config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a constant-valued map archive for a set of sites.
    Build(BuildArgs),

    /// Summarize a map archive.
    Inspect(InspectArgs),

    /// Union partial-map archives into one.
    Combine(CombineArgs),

    /// Export per-site records as JSON lines.
    Export(ExportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Build(args) => run_build(args, config),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Combine(args) => run_combine(args),
        Commands::Export(args) => run_export(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
