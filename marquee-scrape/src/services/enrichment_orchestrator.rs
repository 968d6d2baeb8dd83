//! Bounded concurrent enrichment
//!
//! Takes an ordered list of records and enriches each one from its detail
//! page.
//!
//! # Architecture
//! - Records are split into contiguous batches of `batch_size`
//! - Every record of a batch runs in its own task
//! - A semaphore shared across all batches (and across calls) bounds the
//!   fetches in flight to `concurrency_limit`
//! - Batch N+1 starts only after batch N is fully reconciled, followed by a
//!   short courtesy delay
//!
//! # Error isolation
//! A record that has no detail key, whose fetch produced no content, whose
//! extraction failed, or whose task panicked is returned unmodified. The four
//! outcomes are logged and counted separately. Output order always equals
//! input order.

use futures::future::join_all;
use marquee_common::events::{EventBus, ScrapeEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ExtractionError;
use crate::services::fetcher::Fetcher;

/// A record that can be enriched from a detail document
pub trait Enrichable: Clone + Send + Sync + 'static {
    /// Detail document URL; `None` means nothing to fetch
    fn detail_key(&self) -> Option<&str>;

    /// Short description for logs
    fn label(&self) -> String;
}

/// Turns a fetched detail document into enrichment fields
///
/// Receives its own copy of the record, so a failed extraction cannot leave
/// the caller's record half-mutated.
pub trait DetailExtractor<R>: Send + Sync {
    fn name(&self) -> &'static str;

    fn enrich(&self, record: R, content: &str) -> Result<R, ExtractionError>;
}

/// Orchestrator knobs
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichSettings {
    /// Maximum records being fetched/extracted at once
    pub concurrency_limit: usize,
    pub batch_size: usize,
    /// Pause between batches (not after the last one)
    pub batch_delay: Duration,
    /// Only the first N records are enriched; the rest pass through
    pub details_limit: Option<usize>,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: crate::config::DEFAULT_CONCURRENCY_LIMIT,
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(crate::config::DEFAULT_BATCH_DELAY_MS),
            details_limit: None,
        }
    }
}

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    Enriched,
    /// No detail key, nothing fetched
    Skipped,
    /// Fetch exhausted its retries
    FetchFailed,
    /// Detail document fetched but extraction failed
    ParseFailed,
    /// Task panicked or was aborted
    TaskFailed,
    /// Beyond `details_limit` or after cancellation
    NotAttempted,
}

/// Per-outcome tallies of one enrichment call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub enriched: usize,
    pub skipped: usize,
    pub fetch_failed: usize,
    pub parse_failed: usize,
    pub task_failed: usize,
    pub not_attempted: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: EnrichOutcome) {
        match outcome {
            EnrichOutcome::Enriched => self.enriched += 1,
            EnrichOutcome::Skipped => self.skipped += 1,
            EnrichOutcome::FetchFailed => self.fetch_failed += 1,
            EnrichOutcome::ParseFailed => self.parse_failed += 1,
            EnrichOutcome::TaskFailed => self.task_failed += 1,
            EnrichOutcome::NotAttempted => self.not_attempted += 1,
        }
    }

    /// Records returned unmodified for any reason
    pub fn unenriched(&self) -> usize {
        self.skipped + self.fetch_failed + self.parse_failed + self.task_failed + self.not_attempted
    }

    pub fn total(&self) -> usize {
        self.enriched + self.unenriched()
    }
}

/// Result of one enrichment call
#[derive(Debug, Clone)]
pub struct EnrichmentReport<R> {
    /// Same length and order as the input
    pub records: Vec<R>,
    pub counts: OutcomeCounts,
    /// Cancellation stopped batches from launching
    pub cancelled: bool,
}

/// Batches records through the fetcher under a shared concurrency gate
///
/// Construction zeroes the fetcher's metrics; its cache is kept.
pub struct EnrichmentOrchestrator<R> {
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn DetailExtractor<R>>,
    gate: Arc<Semaphore>,
    settings: EnrichSettings,
    events: Option<EventBus>,
}

impl<R: Enrichable> EnrichmentOrchestrator<R> {
    pub fn new(
        fetcher: Arc<Fetcher>,
        extractor: Arc<dyn DetailExtractor<R>>,
        settings: EnrichSettings,
    ) -> Self {
        fetcher.reset_metrics();
        let permits = settings.concurrency_limit.max(1);
        Self {
            fetcher,
            extractor,
            gate: Arc::new(Semaphore::new(permits)),
            settings,
            events: None,
        }
    }

    /// Report progress on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Enrich `records`, returning them in input order
    pub async fn enrich(&self, records: Vec<R>) -> Vec<R> {
        self.enrich_with_report(records, "records", &CancellationToken::new())
            .await
            .records
    }

    /// Enrich `records` and report per-outcome counts
    ///
    /// `label` names the list in logs and progress events. Once `cancel` is
    /// triggered no further batch is launched; the running batch completes
    /// and the remaining records are appended unmodified.
    pub async fn enrich_with_report(
        &self,
        records: Vec<R>,
        label: &str,
        cancel: &CancellationToken,
    ) -> EnrichmentReport<R> {
        let mut counts = OutcomeCounts::default();
        let mut output = Vec::with_capacity(records.len());
        let mut cancelled = false;

        let mut pending = records;
        let limit = self
            .settings
            .details_limit
            .map_or(pending.len(), |l| l.min(pending.len()));
        let beyond_limit = pending.split_off(limit);

        let total = pending.len();
        let batch_size = self.settings.batch_size.max(1);
        let batch_count = total.div_ceil(batch_size);

        info!(
            list = label,
            total,
            batches = batch_count,
            concurrency = self.settings.concurrency_limit,
            "Fetching detail pages"
        );

        let mut remaining = pending.into_iter();
        for batch_index in 0..batch_count {
            if cancel.is_cancelled() {
                let rest: Vec<R> = remaining.by_ref().collect();
                warn!(
                    list = label,
                    batch = batch_index + 1,
                    skipped_records = rest.len(),
                    "Cancelled, not launching further batches"
                );
                for record in rest {
                    counts.record(EnrichOutcome::NotAttempted);
                    output.push(record);
                }
                cancelled = true;
                break;
            }

            let batch: Vec<R> = remaining.by_ref().take(batch_size).collect();
            info!(
                list = label,
                batch = batch_index + 1,
                of = batch_count,
                size = batch.len(),
                "Processing batch"
            );

            for (record, outcome) in self.run_batch(batch).await {
                counts.record(outcome);
                output.push(record);
            }

            if let Some(events) = &self.events {
                events.emit_lossy(ScrapeEvent::progress(label, output.len(), total));
            }

            let is_last = batch_index + 1 == batch_count;
            if !is_last && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        for record in beyond_limit {
            counts.record(EnrichOutcome::NotAttempted);
            output.push(record);
        }

        info!(
            list = label,
            enriched = counts.enriched,
            skipped = counts.skipped,
            fetch_failed = counts.fetch_failed,
            parse_failed = counts.parse_failed,
            task_failed = counts.task_failed,
            not_attempted = counts.not_attempted,
            "Detail enrichment finished"
        );

        if let Some(events) = &self.events {
            events.emit_lossy(ScrapeEvent::EnrichmentCompleted {
                label: label.to_string(),
                enriched: counts.enriched,
                unenriched: counts.unenriched(),
                timestamp: chrono::Utc::now(),
            });
        }

        EnrichmentReport {
            records: output,
            counts,
            cancelled,
        }
    }

    /// Run one batch concurrently, results in batch order
    async fn run_batch(&self, batch: Vec<R>) -> Vec<(R, EnrichOutcome)> {
        let mut originals = Vec::with_capacity(batch.len());
        let mut handles = Vec::with_capacity(batch.len());

        for record in batch {
            originals.push(record.clone());
            handles.push(tokio::spawn(enrich_one(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
                Arc::clone(&self.gate),
                record,
            )));
        }

        join_all(handles)
            .await
            .into_iter()
            .zip(originals)
            .map(|(joined, original)| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!(record = %original.label(), error = %e, "Enrichment task failed");
                    (original, EnrichOutcome::TaskFailed)
                }
            })
            .collect()
    }
}

/// Fetch and extract one record; any failure yields the record unchanged
async fn enrich_one<R: Enrichable>(
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn DetailExtractor<R>>,
    gate: Arc<Semaphore>,
    record: R,
) -> (R, EnrichOutcome) {
    let Some(url) = record.detail_key().map(str::to_owned) else {
        debug!(record = %record.label(), "No detail URL, skipping");
        return (record, EnrichOutcome::Skipped);
    };

    let _permit = match gate.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            error!(record = %record.label(), "Concurrency gate closed");
            return (record, EnrichOutcome::TaskFailed);
        }
    };

    let content = match fetcher.fetch(&url).await {
        Ok(content) => content,
        Err(e) => {
            warn!(record = %record.label(), error = %e, "Detail fetch failed, keeping listing data");
            return (record, EnrichOutcome::FetchFailed);
        }
    };

    match extractor.enrich(record.clone(), &content) {
        Ok(enriched) => (enriched, EnrichOutcome::Enriched),
        Err(e) => {
            warn!(
                record = %record.label(),
                extractor = extractor.name(),
                error = %e,
                "Detail extraction failed, keeping listing data"
            );
            (record, EnrichOutcome::ParseFailed)
        }
    }
}
