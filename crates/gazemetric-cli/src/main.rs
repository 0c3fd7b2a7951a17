use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod score;

#[derive(Parser)]
#[command(name = "gazemetric", version, about = "Engagement scoring from recorded facial-landmark streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay detector output (JSON Lines, one detection result per line)
    /// through a scoring session and print running scores.
    Score {
        /// Input path, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: String,
        /// Calibration warm-up window in frames.
        #[arg(long)]
        adaptive_frames: Option<u32>,
        /// Print the final summary as JSON.
        #[arg(long)]
        json: bool,
        /// Suppress per-frame output; print the summary only.
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Score {
            input,
            adaptive_frames,
            json,
            quiet,
        } => score::run(&input, adaptive_frames, json, quiet),
    }
}
