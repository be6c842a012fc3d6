//! tdgrid CLI - Q-learning on a deterministic grid world
//!
//! Subcommands:
//! - `train`: learn a Q-table and show the greedy path
//! - `grid`: print a grid layout and its legal actions

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tdgrid")]
#[command(version, about = "Tabular Q-learning on a grid world", long_about = None)]
struct Cli {
    /// Log episode-level detail (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-learning agent on a grid world
    Train(Box<tdgrid::cli::commands::train::TrainArgs>),

    /// Show a grid layout and its legal actions
    Grid(tdgrid::cli::commands::grid::GridArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Train(args) => tdgrid::cli::commands::train::execute(*args),
        Commands::Grid(args) => tdgrid::cli::commands::grid::execute(args),
    }
}
