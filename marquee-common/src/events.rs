//! Run events and the event bus
//!
//! The scrape pipeline reports progress by broadcasting [`ScrapeEvent`]s.
//! Consumers (a console progress bar, tests) subscribe; the pipeline never
//! waits on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// Scrape run events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ScrapeEvent {
    /// A listing page was fetched and parsed
    ListingParsed {
        /// Listing label (e.g. "Top Rated")
        listing: String,
        /// Number of records found on the page
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A listing page could not be fetched or yielded nothing
    ListingFailed {
        listing: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Cumulative enrichment progress, emitted after every batch
    EnrichmentProgress {
        /// Label of the list being enriched
        label: String,
        /// Records reconciled so far
        completed: usize,
        /// Records in the list
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// Enrichment of one list finished
    EnrichmentCompleted {
        label: String,
        enriched: usize,
        unenriched: usize,
        timestamp: DateTime<Utc>,
    },

    /// The whole run finished (output written or not)
    RunCompleted {
        duration_ms: u64,
        output_written: bool,
        timestamp: DateTime<Utc>,
    },
}

impl ScrapeEvent {
    /// Progress event stamped with the current time
    pub fn progress(label: impl Into<String>, completed: usize, total: usize) -> Self {
        ScrapeEvent::EnrichmentProgress {
            label: label.into(),
            completed,
            total,
            timestamp: Utc::now(),
        }
    }

    /// Run-completed event stamped with the current time
    pub fn run_completed(duration: Duration, output_written: bool) -> Self {
        ScrapeEvent::RunCompleted {
            duration_ms: duration.as_millis() as u64,
            output_written,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus for [`ScrapeEvent`]s
///
/// # Examples
///
/// ```
/// use marquee_common::events::{EventBus, ScrapeEvent};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
/// bus.emit_lossy(ScrapeEvent::progress("Top Rated", 25, 250));
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScrapeEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ScrapeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ScrapeEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit_lossy(ScrapeEvent::progress("x", 1, 2));
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit_lossy(ScrapeEvent::progress("Popular", 25, 30));
        bus.emit_lossy(ScrapeEvent::progress("Popular", 30, 30));

        match rx.recv().await.unwrap() {
            ScrapeEvent::EnrichmentProgress { completed, total, .. } => {
                assert_eq!((completed, total), (25, 30));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ScrapeEvent::EnrichmentProgress { completed, .. } => assert_eq!(completed, 30),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(ScrapeEvent::run_completed(Duration::from_millis(1500), true))
            .unwrap();
        assert_eq!(json["type"], "RunCompleted");
        assert_eq!(json["duration_ms"], 1500);
    }
}
