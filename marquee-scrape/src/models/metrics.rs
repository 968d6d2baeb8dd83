//! Fetch metrics
//!
//! Counters are incremented only by the fetcher and read once a run ends.
//! They are atomics because fetches run on a multi-threaded runtime.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a fetcher
#[derive(Debug, Default)]
pub struct FetchMetrics {
    requests_made: AtomicU64,
    cache_hits: AtomicU64,
    errors: AtomicU64,
    timeouts: AtomicU64,
    rate_limited: AtomicU64,
}

/// Point-in-time copy of [`FetchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Successful (HTTP 200) network fetches
    pub requests_made: u64,
    /// Fetches answered from the cache
    pub cache_hits: u64,
    /// Unexpected transport failures
    pub errors: u64,
    /// Attempts that timed out
    pub timeouts: u64,
    /// Attempts answered with HTTP 429
    pub rate_limited: u64,
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.requests_made.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.rate_limited.store(0, Ordering::Relaxed);
    }
}
