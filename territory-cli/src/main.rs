//! TERRITORY CLI - Command-line interface
//!
//! Commands:
//! - play: Play an interactive game against the AI in the terminal
//! - simulate: Run headless games between a scripted player and the AI

mod play;
mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use territory_core::EngineConfig;

#[derive(Parser)]
#[command(name = "territory")]
#[command(about = "Turn-based territory game against a coin-flip AI")]
struct Cli {
    /// Random seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Engine configuration JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the AI in the terminal
    Play(play::PlayArgs),
    /// Play many headless games and report statistics
    Simulate(simulate::SimulateArgs),
}

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Play(args) => play::run(args, config, cli.seed),
        Commands::Simulate(args) => simulate::run(args, config, cli.seed),
    }
}

/// Config file if given, defaults otherwise
fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
