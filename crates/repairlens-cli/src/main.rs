use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "repairlens")]
#[command(about = "RepairLens CLI - photo-to-repair-plan pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo and produce a repair plan
    Analyze {
        /// Path to the photo of the broken object
        image: PathBuf,
        /// Optional free-text note about the problem
        #[arg(long)]
        hint: Option<String>,
        /// Emit incremental events as JSON lines instead of one blocking result
        #[arg(long)]
        stream: bool,
        /// Pretty-print the blocking JSON result
        #[arg(long)]
        pretty: bool,
        /// Ignore configured API keys; model-backed stages degrade to fallbacks
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            image,
            hint,
            stream,
            pretty,
            offline,
        } => commands::analyze::run(image, hint, stream, pretty, offline).await?,
    }

    Ok(())
}
