//! marquee-scrape - chart scraper entry point
//!
//! Fetches the top-rated and most-popular movie charts, enriches each entry
//! from its title page with bounded concurrency, and writes a CSV report plus
//! a metrics summary.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marquee_common::config::{resolve_toml_config, LoggingConfig};
use marquee_common::events::EventBus;
use marquee_scrape::cli::Args;
use marquee_scrape::progress::{finish_progress, spawn_console_progress};
use marquee_scrape::services::ReqwestTransport;
use marquee_scrape::{Scraper, ScraperConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = resolve_toml_config(args.config.as_deref())
        .context("Failed to load configuration file")?;

    init_tracing(&toml_config.logging, args.log_level.as_deref())?;

    let config = ScraperConfig::resolve(&args.overrides(), &toml_config.scrape)
        .context("Invalid configuration")?;

    info!("Starting marquee-scrape v{}", env!("CARGO_PKG_VERSION"));
    info!(
        concurrency = config.concurrency_limit,
        batch_size = config.batch_size,
        cache = config.cache_enabled,
        output = %config.output.display(),
        "Configuration resolved"
    );

    let transport = ReqwestTransport::new(&config.user_agent, config.request_timeout)
        .context("Failed to create HTTP client")?;

    let events = EventBus::new(100);
    let progress = spawn_console_progress(&events);

    let scraper = Scraper::new(config, Arc::new(transport), events)
        .context("Failed to initialize scraper")?;

    let cancel = CancellationToken::new();
    tokio::spawn(interrupt_watcher(cancel.clone()));

    let report = scraper.run(&cancel).await;
    finish_progress(progress).await;

    if !report.succeeded() {
        // The error has already been logged by the run driver
        std::process::exit(1);
    }

    Ok(())
}

/// Console + optional file logging; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let level = level_override.unwrap_or(&logging.level);
    let default_directive = format!("marquee_scrape={level},marquee_common={level}");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// Cancel the run on Ctrl+C; a second Ctrl+C exits immediately
async fn interrupt_watcher(cancel: CancellationToken) {
    if signal::ctrl_c().await.is_err() {
        warn!("Failed to install Ctrl+C handler");
        return;
    }
    warn!("Interrupted, finishing in-flight batch before writing output");
    cancel.cancel();

    if signal::ctrl_c().await.is_ok() {
        warn!("Interrupted again, exiting");
        std::process::exit(130);
    }
}
