//! offcache - a read-only offline asset cache for a web client.
//!
//! `install` seeds a named cache with a fixed list of assets; `fetch` serves
//! one request from that cache, falling back to the live network on a miss
//! without writing the result back.

mod agent;
mod assets;
mod cache;
mod config;
mod models;
mod net;
mod utils;

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agent::OfflineAgent;
use cache::CacheStorage;
use config::Config;
use models::AssetRequest;
use net::NetClient;
use utils::format_size;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("offcache - read-only offline asset cache for a web client");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  offcache install            pre-populate the asset cache");
    eprintln!("  offcache fetch <path|url>   serve one request (body to stdout)");
    eprintln!("  offcache status             list cached entries");
    eprintln!("  offcache clear              remove the asset cache");
    eprintln!("  offcache set-origin <url>   save the origin assets resolve against");
    eprintln!();
    eprintln!(
        "The origin can also be set with the {} environment variable.",
        config::ORIGIN_ENV
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("install") => install().await,
        Some("fetch") => {
            let target = args.get(2).context("Usage: offcache fetch <path|url>")?;
            fetch(target).await
        }
        Some("status") => status(),
        Some("clear") => clear(),
        Some("set-origin") => {
            let origin = args.get(2).context("Usage: offcache set-origin <url>")?;
            set_origin(origin)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn install() -> Result<()> {
    let config = Config::load()?;
    let storage = CacheStorage::new(config.cache_root()?)?;
    let agent = OfflineAgent::new(&storage, NetClient::new()?, config.origin()?)?;

    agent.install().await?;
    println!(
        "Installed {} assets into {}",
        assets::PRECACHE_ASSETS.len(),
        agent.cache().name()
    );
    Ok(())
}

async fn fetch(target: &str) -> Result<()> {
    let config = Config::load()?;
    let origin = config.origin()?;
    let storage = CacheStorage::new(config.cache_root()?)?;
    let agent = OfflineAgent::new(&storage, NetClient::new()?, origin.clone())?;

    let request = AssetRequest::resolve(&origin, target)
        .with_context(|| format!("Invalid request target: {}", target))?;

    let (response, source) = agent.handle_fetch(&request).await?;
    eprintln!(
        "{} {} ({}, {})",
        response.status,
        response.url,
        source.label(),
        format_size(response.body.len())
    );
    io::stdout().write_all(&response.body)?;
    Ok(())
}

fn status() -> Result<()> {
    let config = Config::load()?;
    let storage = CacheStorage::new(config.cache_root()?)?;
    let cache = storage.open(assets::CACHE_NAME)?;

    let entries = cache.entries()?;
    if entries.is_empty() {
        println!("Cache {} is empty - run `offcache install`", cache.name());
        return Ok(());
    }

    println!("Cache {} ({} entries):", cache.name(), entries.len());
    for entry in entries {
        println!(
            "  {}  {}  {}",
            entry.response.url,
            format_size(entry.response.body.len()),
            entry.age_display()
        );
    }
    Ok(())
}

fn clear() -> Result<()> {
    let config = Config::load()?;
    let storage = CacheStorage::new(config.cache_root()?)?;

    if storage.remove(assets::CACHE_NAME)? {
        println!("Removed cache {}", assets::CACHE_NAME);
    } else {
        println!("Cache {} does not exist", assets::CACHE_NAME);
    }
    Ok(())
}

fn set_origin(origin: &str) -> Result<()> {
    let url = url::Url::parse(origin).with_context(|| format!("Invalid origin URL: {}", origin))?;

    let mut config = Config::load()?;
    config.origin = Some(url.to_string());
    config.save()?;
    println!("Origin set to {}", url);
    Ok(())
}
