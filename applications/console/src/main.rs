/// Chorus Console - drive chat playback from a terminal
use chorus_console::{config::ConsoleConfig, console};
use chorus_core::types::format_duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chorus-console")]
#[command(about = "Chat-scoped playback queue, driven from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read chat commands from stdin
    Run {
        /// Configuration file path
        #[arg(short, long, env = "CHORUS_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the configured catalog
    Catalog {
        /// Configuration file path
        #[arg(short, long, env = "CHORUS_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so replies stay readable on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorus_console=info,chorus_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = load_config(config)?;
            console::run(config).await?;
        }
        Commands::Catalog { config } => {
            let config = load_config(config)?;
            print_catalog(&config);
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ConsoleConfig> {
    let config = ConsoleConfig::load(path.as_deref())?;
    config.validate()?;

    tracing::info!(
        queue_capacity = config.playback.queue_capacity,
        duration_limit_secs = config.playback.duration_limit_secs,
        "Configuration loaded"
    );
    Ok(config)
}

fn print_catalog(config: &ConsoleConfig) {
    let limit = config.playback.duration_limit_secs;
    for entry in &config.catalog {
        let flag = if entry.duration_secs > limit {
            " (too long)"
        } else {
            ""
        };
        println!(
            "{} [{}]{}\n    {}",
            entry.title,
            format_duration(Duration::from_secs(entry.duration_secs)),
            flag,
            entry.url
        );
    }
}
