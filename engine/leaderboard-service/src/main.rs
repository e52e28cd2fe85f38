//! Leaderboard service entry point
//!
//! Polls the configured row source and prints the standings whenever they
//! change. `--once` fetches a single time and exits.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use leaderboard_service::{
    build_source, initialize_logging, render_table, shutdown_signal, LeaderboardPoller,
    ServiceConfig,
};

/// Competition leaderboard poller
#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(about = "Keeps a competition leaderboard current")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sheet endpoint returning {headers, data} JSON
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Local JSON payload to read instead of an endpoint
    #[arg(long)]
    file: Option<PathBuf>,

    /// Seconds between refreshes
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Fetch once, print the leaderboard, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())
            .context("Failed to load configuration")?;

    // Command-line flags win over the file and the environment
    if let Some(url) = args.url {
        config.source.url = Some(url);
        config.source.file = None;
    }
    if let Some(file) = args.file {
        config.source.file = Some(file);
        config.source.url = None;
    }
    if let Some(secs) = args.interval_secs {
        config.poll.interval_secs = secs;
    }
    config.validate().context("Invalid configuration")?;

    initialize_logging(&config.logging)?;
    info!(
        "Starting leaderboard service v{}",
        leaderboard_service::VERSION
    );

    let source = build_source(&config.source).context("Failed to create row source")?;
    let mut poller = LeaderboardPoller::new(source, config.poll.clone());

    if args.once {
        let view = poller.tick().await.context("Failed to fetch leaderboard")?;
        print!("{}", render_table(view));
        return Ok(());
    }

    let mut updates = poller.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let table = render_table(&updates.borrow_and_update());
            println!("{}", table);
        }
    });

    info!("Leaderboard service is running. Press Ctrl+C to stop.");
    poller.run(shutdown_signal()).await;

    // Dropping the poller closes the channel and ends the printer
    drop(poller);
    if let Err(e) = printer.await {
        error!("Leaderboard printer task failed: {}", e);
    }

    info!("Leaderboard service shutdown complete");
    Ok(())
}
