//! adaptiq CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "adaptiq", version, about = "Adaptive difficulty quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive quiz in the terminal
    Play {
        /// Path to a question pool file or directory
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a game with a simulated player
    Simulate {
        /// Path to a question pool file or directory
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Probability that the simulated player answers correctly
        #[arg(long, default_value = "0.7")]
        accuracy: f64,

        /// Seed for the question order and the simulated player
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u64>,

        /// Write the session summary as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question pool files
    Validate {
        /// Path to a question pool file or directory
        #[arg(long)]
        pool: PathBuf,
    },

    /// Create starter config and example question pool
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { pool, seed, config } => commands::play::execute(pool, seed, config).await,
        Commands::Simulate {
            pool,
            accuracy,
            seed,
            rounds,
            output,
            config,
        } => commands::simulate::execute(pool, accuracy, seed, rounds, output, config).await,
        Commands::Validate { pool } => commands::validate::execute(pool),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
