//! Scrape run driver
//!
//! # Run sequence
//! 1. Fetch and parse both chart pages concurrently
//! 2. Enrich each list from title pages (optional)
//! 3. Write the records and summary tables
//! 4. Log the run summary
//!
//! A failed chart yields an empty list; only an output failure fails the run.

use chrono::Local;
use marquee_common::events::{EventBus, ScrapeEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ScraperConfig;
use crate::error::{ExtractionError, SinkError};
use crate::extractors::{ListingParser, MovieDetailExtractor};
use crate::models::{ListingKind, MetricsSnapshot, Movie};
use crate::services::enrichment_orchestrator::{EnrichmentOrchestrator, OutcomeCounts};
use crate::services::fetcher::Fetcher;
use crate::services::http_transport::HttpTransport;
use crate::sink::{self, OutputFiles, RunSummary};

/// Outcome of a full run
#[derive(Debug)]
pub struct RunReport {
    pub top: Vec<Movie>,
    pub popular: Vec<Movie>,
    pub top_counts: OutcomeCounts,
    pub popular_counts: OutcomeCounts,
    pub metrics: MetricsSnapshot,
    pub duration: Duration,
    pub cancelled: bool,
    pub output: Result<OutputFiles, SinkError>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.output.is_ok()
    }
}

/// One configured scrape session
///
/// Construction creates a fresh fetcher, so cache and metrics start empty.
pub struct Scraper {
    config: ScraperConfig,
    fetcher: Arc<Fetcher>,
    listing_parser: ListingParser,
    orchestrator: EnrichmentOrchestrator<Movie>,
    events: EventBus,
}

impl Scraper {
    pub fn new(
        config: ScraperConfig,
        transport: Arc<dyn HttpTransport>,
        events: EventBus,
    ) -> Result<Self, ExtractionError> {
        let fetcher = Arc::new(Fetcher::new(transport, config.fetch_settings()));
        let listing_parser = ListingParser::new(&config.base_url)?;
        let orchestrator = EnrichmentOrchestrator::new(
            Arc::clone(&fetcher),
            Arc::new(MovieDetailExtractor::new()?),
            config.enrich_settings(),
        )
        .with_events(events.clone());

        Ok(Self {
            config,
            fetcher,
            listing_parser,
            orchestrator,
            events,
        })
    }

    /// Fetch and parse one chart; failures give an empty list
    pub async fn fetch_listing(&self, kind: ListingKind) -> Vec<Movie> {
        let url = match kind {
            ListingKind::TopRated => self.config.top_rated_url(),
            ListingKind::Popular => self.config.popular_url(),
        };

        info!(listing = %kind, url = %url, "Fetching chart");

        let failed = |reason: String| {
            error!(listing = %kind, reason = %reason, "Chart unavailable");
            self.events.emit_lossy(ScrapeEvent::ListingFailed {
                listing: kind.label().to_string(),
                reason,
                timestamp: chrono::Utc::now(),
            });
            Vec::new()
        };

        let content = match self.fetcher.fetch(&url).await {
            Ok(content) => content,
            Err(e) => return failed(e.to_string()),
        };

        match self.listing_parser.parse(&content, kind) {
            Ok(movies) => {
                info!(listing = %kind, count = movies.len(), "Found movies");
                self.events.emit_lossy(ScrapeEvent::ListingParsed {
                    listing: kind.label().to_string(),
                    count: movies.len(),
                    timestamp: chrono::Utc::now(),
                });
                movies
            }
            Err(e) => failed(format!("{} (the page structure may have changed)", e)),
        }
    }

    /// Run the whole pipeline
    pub async fn run(&self, cancel: &CancellationToken) -> RunReport {
        let start = Instant::now();
        info!("Starting movie scrape");

        let (mut top, mut popular) = tokio::join!(
            self.fetch_listing(ListingKind::TopRated),
            self.fetch_listing(ListingKind::Popular),
        );

        let mut top_counts = OutcomeCounts::default();
        let mut popular_counts = OutcomeCounts::default();
        let mut cancelled = false;

        if self.config.include_details {
            for (kind, list, counts) in [
                (ListingKind::TopRated, &mut top, &mut top_counts),
                (ListingKind::Popular, &mut popular, &mut popular_counts),
            ] {
                if list.is_empty() {
                    continue;
                }
                let report = self
                    .orchestrator
                    .enrich_with_report(std::mem::take(list), kind.label(), cancel)
                    .await;
                *list = report.records;
                *counts = report.counts;
                cancelled |= report.cancelled;
            }
        }

        let metrics = self.fetcher.metrics();
        let duration = start.elapsed();

        let summary = RunSummary {
            duration,
            metrics,
            top_count: top.len(),
            popular_count: popular.len(),
            generated_at: Local::now(),
        };
        let output = sink::write_results(&self.config.output, &top, &popular, &summary);

        log_run_summary(&summary);
        match &output {
            Ok(files) => info!(
                path = %files.records.display(),
                top = top.len(),
                popular = popular.len(),
                "Scrape completed"
            ),
            Err(e) => error!(error = %e, "Scrape completed with errors, output not saved"),
        }
        if cancelled {
            warn!("Run was interrupted; some records were not enriched");
        }

        self.events
            .emit_lossy(ScrapeEvent::run_completed(duration, output.is_ok()));

        RunReport {
            top,
            popular,
            top_counts,
            popular_counts,
            metrics,
            duration,
            cancelled,
            output,
        }
    }
}

fn log_run_summary(summary: &RunSummary) {
    let secs = summary.duration.as_secs_f64();
    let avg = secs / summary.metrics.requests_made.max(1) as f64;
    info!(
        duration_secs = %format!("{:.2}", secs),
        requests_made = summary.metrics.requests_made,
        cache_hits = summary.metrics.cache_hits,
        errors = summary.metrics.errors,
        timeouts = summary.metrics.timeouts,
        rate_limited = summary.metrics.rate_limited,
        avg_request_secs = %format!("{:.2}", avg),
        "Performance metrics"
    );
}
