//! Project Knapsack - Main Server
//!
//! Serves the project API, or solves a project file offline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use project_knapsack::{solver, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "knapsack")]
#[command(about = "Pick the most profitable projects for a worker budget")]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides config.yaml and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Compare brute force and greedy on a YAML/JSON list of projects
    Solve {
        /// File holding a list of {name, workers, profit}
        #[arg(short, long)]
        file: PathBuf,

        /// Worker limit
        #[arg(short, long)]
        limit: u32,

        /// Override solver.max_bruteforce_items
        #[arg(long)]
        max_items: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,project_knapsack=debug,tower_http=debug".into()),
        )
        // stdout is reserved for command output (`solve` prints JSON)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_yaml_and_env(Some(&cli.config))?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            project_knapsack::start_server(config).await
        }
        Commands::Solve {
            file,
            limit,
            max_items,
        } => {
            let limits = max_items.map(solver::Limits::new).unwrap_or(config.limits);
            let mut stdout = std::io::stdout().lock();
            solver::solve_file(&file, limit, limits, &mut stdout)?;
            Ok(())
        }
    }
}
