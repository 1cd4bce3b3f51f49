//! Media feed CLI application.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use media_feed::{
    AniListClient, Dashboard, DashboardList, DashboardOptions, ListState, MediaListRepository,
    MediaSearch, NetworkMediaListSource, RunStatus,
};
use shared::{Config, LogConfig, MediaType};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load trending, seasonal, upcoming and all-time popular lists
    Dashboard {
        /// anime or manga (defaults to the configured type)
        #[arg(short, long)]
        media_type: Option<MediaType>,
    },
    /// Search the catalog
    Search {
        /// Free-text query
        query: String,

        /// anime or manga
        #[arg(short, long, default_value = "anime")]
        media_type: MediaType,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config = LogConfig::from_config(&config, "media-feed");
    if args.verbose {
        log_config.level = tracing::Level::DEBUG;
    }
    let _log_guard = shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Media feed starting");

    let client = AniListClient::from_config(&config.anilist)
        .context("Failed to create AniList client")?;
    let repository = MediaListRepository::new(Arc::new(NetworkMediaListSource::new(client)));

    match args.command {
        Command::Dashboard { media_type } => {
            let media_type = media_type.unwrap_or(config.dashboard.default_media_type);
            run_dashboard(&config, repository, media_type).await
        }
        Command::Search { query, media_type } => {
            run_search(&config, repository, media_type, &query).await
        }
    }
}

async fn run_dashboard(
    config: &Config,
    repository: MediaListRepository,
    media_type: MediaType,
) -> Result<()> {
    let dashboard = Dashboard::new(
        repository,
        Handle::current(),
        DashboardOptions::from_config(config),
    );
    let run = dashboard.refresh(media_type);
    let status = dashboard
        .wait(run)
        .await
        .context("Dashboard run did not finish")?;

    let snapshot = dashboard.snapshot();
    if let (Some(this_season), Some(next_season)) = (snapshot.this_season, snapshot.next_season) {
        info!(%media_type, %this_season, %next_season, "Dashboard loaded");
    }

    for which in DashboardList::ALL {
        print_list(which.as_str(), snapshot.list(which));
    }

    match status {
        RunStatus::Failed { failed, .. } => {
            let names: Vec<&str> = failed.iter().map(|which| which.as_str()).collect();
            Err(anyhow!("Failed to load lists: {}", names.join(", ")))
        }
        _ => Ok(()),
    }
}

async fn run_search(
    config: &Config,
    repository: MediaListRepository,
    media_type: MediaType,
    query: &str,
) -> Result<()> {
    let search = MediaSearch::new(repository, Handle::current(), Some(config.query_timeout()));
    let mut state_rx = search.subscribe();

    let run = search
        .search(media_type, query)
        .ok_or_else(|| anyhow!("Search query is empty"))?;
    let state = state_rx
        .wait_for(|state| state.run == Some(run) && !state.results.is_pending())
        .await
        .context("Search stopped before it finished")?
        .clone();

    print_list(&format!("search \"{}\"", state.query), &state.results);

    match state.results.error() {
        Some(e) => Err(anyhow!("Search failed: {}", e)),
        None => Ok(()),
    }
}

fn print_list(label: &str, list: &ListState) {
    println!("== {}", label);
    match list {
        ListState::Pending => println!("   (not loaded)"),
        ListState::Failed(e) => println!("   failed: {}", e),
        ListState::Loaded(page) if page.is_empty() => println!("   (no results)"),
        ListState::Loaded(page) => {
            for media in &page.media {
                println!(
                    "   {:>7}  {}",
                    media.id,
                    media.display_title().unwrap_or("<untitled>")
                );
            }
        }
    }
}
