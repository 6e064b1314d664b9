use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kalorie_core::{EventBus, HttpApiClient, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{ConfigCommand, DiaryCommand, GoalsCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "kalorie")]
#[command(version)]
#[command(about = "Calorie and nutrition goal tracker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// View and edit the food diary
    Diary(DiaryCommand),

    /// View and edit daily nutrition goals
    Goals(GoalsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kalorie=info,kalorie_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Diary(cmd)) => {
            let store = connect(&config)?;
            cmd.run(store).await?;
        }
        Some(Commands::Goals(cmd)) => {
            let store = connect(&config)?;
            cmd.run(store, EventBus::default(), config.default_split.value)
                .await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Builds the store backed by the configured HTTP API.
fn connect(config: &Config) -> Result<Arc<Store>, Box<dyn std::error::Error>> {
    let client = HttpApiClient::with_timeout(
        config.api_url.value.clone(),
        Duration::from_secs(config.request_timeout_secs.value),
    )?;
    tracing::debug!(api_url = client.base_url(), "using backend");
    Ok(Arc::new(Store::new(Arc::new(client))))
}
