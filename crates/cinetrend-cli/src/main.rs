//! CineTrend CLI - Movie discovery and trending searches from the terminal

mod config;
mod render;

use std::sync::Arc;

use anyhow::Result;
use cinetrend_client::{CatalogClient, CatalogService};
use cinetrend_core::{SortOrder, TrendingView};
use cinetrend_session::{Session, TrendAggregator};
use cinetrend_store::CounterStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::render::{render_movie, render_search, render_trending};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cinetrend=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    let command = &args[1];

    match command.as_str() {
        "help" | "--help" | "-h" => print_help(),
        "search" => {
            if args.len() < 3 {
                eprintln!("Usage: cinetrend-cli search <terms...>");
                return Ok(());
            }
            search(&args[2..].join(" ")).await?;
        }
        "discover" => discover().await?,
        "trending" => trending().await?,
        "session" => run_session().await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"CineTrend CLI - Find movies you'll enjoy without the hassle

USAGE:
    cinetrend-cli <COMMAND> [OPTIONS]

COMMANDS:
    help            Show this help message
    search          Search the catalog and count the search as trending
    discover        List popular movies
    trending        Show the most searched terms
    session         Interactive session: each line typed is the new search input

ENVIRONMENT:
    CINETREND_API_BASE_URL      Catalog base URL (default http://127.0.0.1:3000)
    CINETREND_API_TIMEOUT_SECS  Catalog request timeout (default 10)
    CINETREND_STORE             Counter store directory, or "memory" (default ./cinetrend-data)

EXAMPLES:
    cinetrend-cli search the dark knight
    cinetrend-cli discover
    cinetrend-cli trending
    cinetrend-cli session
"#
    );
}

async fn search(query: &str) -> Result<()> {
    let config = CliConfig::from_env()?;
    let client = CatalogClient::new(config.catalog)?;
    let store = config.store.open().await?;

    let results = client.search(query.trim()).await?;
    if results.is_empty() {
        println!("No movies found for \"{}\"", query.trim());
        return Ok(());
    }

    println!("Results for \"{}\":", query.trim());
    for movie in &results {
        println!("{}", render_movie(movie));
    }

    let aggregator = TrendAggregator::new(store, config.session.trending_limit);
    let entry = aggregator.record(query, &results[0]).await?;
    println!();
    println!("\"{}\" has been searched {} time(s)", entry.key, entry.count);
    Ok(())
}

async fn discover() -> Result<()> {
    let config = CliConfig::from_env()?;
    let client = CatalogClient::new(config.catalog)?;

    let results = client.discover(SortOrder::PopularityDesc).await?;
    println!("Popular movies:");
    for movie in &results {
        println!("{}", render_movie(movie));
    }
    Ok(())
}

async fn trending() -> Result<()> {
    let config = CliConfig::from_env()?;
    let store = config.store.open().await?;

    let entries = store.top_k(config.session.trending_limit).await?;
    let view = TrendingView::from_entries(entries);
    if view.is_empty() {
        println!("Nothing trending yet");
    } else {
        print!("{}", render_trending(&view));
    }
    Ok(())
}

async fn run_session() -> Result<()> {
    let config = CliConfig::from_env()?;
    let catalog: Arc<dyn CatalogService> = Arc::new(CatalogClient::new(config.catalog)?);
    let store = config.store.open().await?;

    tracing::info!("Using counter store at {}", config.store);

    let session = Session::start(config.session, catalog, store);
    let mut search = session.subscribe_search();
    let mut trending = session.subscribe_trending();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type to search, empty line for popular movies, Ctrl+D to quit.");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => session.on_input_change(line),
                None => break,
            },
            changed = search.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = search.borrow_and_update().clone();
                print!("{}", render_search(&state));
            }
            changed = trending.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = trending.borrow_and_update().clone();
                print!("{}", render_trending(&view));
            }
        }
    }

    session.shutdown().await?;
    Ok(())
}
