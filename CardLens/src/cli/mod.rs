//! CardLens CLI - Command-line interface for card extraction

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

use crate::card::ExtractOptions;

#[derive(Parser)]
#[command(name = "cardlens", version = crate::VERSION)]
#[command(about = "CardLens: find character cards hidden in PNG images", long_about = None)]
struct Cli {
    /// TOML config file (defaults to <config dir>/cardlens/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "cardlens=debug",
        _ => "cardlens=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CardLens CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match &cli.config {
        Some(path) => ExtractOptions::load(path)?,
        None => ExtractOptions::load_default()?,
    };

    cli.command.execute(&options)?;

    Ok(())
}
