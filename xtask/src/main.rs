//! xtask - Development task runner for balanced-forest
//!
//! Usage:
//!   cargo xtask stress --scenario <yaml> [options]

mod stress;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development task runner for balanced-forest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a seeded operation stream against the tree engines
    Stress(stress::StressArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xtask=info,balanced_forest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stress(args) => stress::run(&args),
    }
}
