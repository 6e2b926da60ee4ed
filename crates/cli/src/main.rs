use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use scantrack_cli::commands;
use scantrack_cli::config::StudyConfig;

#[derive(Parser)]
#[command(name = "scantrack")]
#[command(about = "Track MRI acquisition and processing status per subject and visit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Study config file
    #[arg(short, long, global = true, default_value = "scantrack.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the acquisition presence matrix for one visit
    Acquisition {
        /// Visit key from the config (e.g. newborn)
        #[arg(long)]
        visit: String,
    },
    /// Build the derivative presence matrix for one visit
    Derivatives {
        /// Visit key from the config (e.g. newborn)
        #[arg(long)]
        visit: String,
    },
    /// Merge the saved matrices with the clinical export and reconcile
    Reconcile,
    /// Build every visit's matrices, then reconcile
    Run,
    /// Print per-visit counts from the reconciled report
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();

    let config = StudyConfig::load(&cli.config)?;
    match cli.command {
        Commands::Acquisition { visit } => commands::run_acquisition(&config, &visit),
        Commands::Derivatives { visit } => commands::run_derivatives(&config, &visit),
        Commands::Reconcile => commands::run_reconcile(&config),
        Commands::Run => commands::run_all(&config),
        Commands::Summary => commands::run_summary(&config),
    }
}
