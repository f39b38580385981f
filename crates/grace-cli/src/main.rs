//! Grace CLI - run the field and oscillator simulations.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grace")]
#[command(author, version, about = "Grace - layered field and oscillator simulations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default grace.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run the substrate → matter → accumulation loop
    Ecosystem {
        /// Number of ticks to run
        #[arg(short, long, default_value = "1800")]
        steps: u64,

        /// Print a record every N ticks
        #[arg(short, long, default_value = "60")]
        record_every: u64,

        /// Override all seeds (layers derive theirs from it)
        #[arg(long)]
        seed: Option<u64>,

        /// Override the grid size
        #[arg(long)]
        size: Option<usize>,

        /// Write a JSON report to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Relax the oscillator mesh
    Mesh {
        /// Number of ticks to run
        #[arg(short, long, default_value = "2000")]
        steps: usize,

        /// Sample every N ticks
        #[arg(short, long, default_value = "100")]
        record_every: usize,

        /// Override the seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the lattice rows
        #[arg(long)]
        rows: Option<usize>,

        /// Write a JSON report to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Ecosystem {
            steps,
            record_every,
            seed,
            size,
            json,
        } => commands::ecosystem::run(steps, record_every, seed, size, json.as_deref()),
        Commands::Mesh {
            steps,
            record_every,
            seed,
            rows,
            json,
        } => commands::mesh::run(steps, record_every, seed, rows, json.as_deref()),
    }
}
