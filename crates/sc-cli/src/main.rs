//! CLI frontend for the Statecraft state mutation engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sc",
    about = "Statecraft: replay command-driven roleplay state",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a card and list its parameters and entities
    Check {
        /// Card configuration (JSON)
        #[arg(short, long)]
        card: PathBuf,
    },

    /// Parse one block of text and show the commands it contains
    Parse {
        /// Card configuration (JSON)
        #[arg(short, long)]
        card: PathBuf,

        /// Text to parse (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Replay a conversation history and print the resulting state
    Replay {
        /// Card configuration (JSON)
        #[arg(short, long)]
        card: PathBuf,

        /// History file: a JSON array of {role, text}
        #[arg(short = 'H', long)]
        history: PathBuf,

        /// Stop after this turn (default: the last turn)
        #[arg(short, long)]
        index: Option<usize>,

        /// Only apply commands written by the assistant
        #[arg(long)]
        assistant_only: bool,

        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { card } => commands::check::run(&card),
        Commands::Parse { card, file } => commands::parse::run(&card, file.as_deref()),
        Commands::Replay {
            card,
            history,
            index,
            assistant_only,
            json,
        } => commands::replay::run(&card, &history, index, assistant_only, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
