//! Fetch with cache and bounded retry
//!
//! # Attempt handling
//! Each fetch makes at most `max_retries` attempts:
//! - HTTP 200: counted as a request made, cached (when enabled), returned
//! - HTTP 429: wait `2^attempt` seconds (1s, 2s, 4s, ...) before the next attempt
//! - Other status: logged, next attempt immediately
//! - Timeout: wait 1 second
//! - Other transport failure: counted as an error, wait 1 second
//!
//! No wait follows the final attempt. Failures are never cached.
//!
//! A fresh cache entry short-circuits the whole loop and counts as a cache
//! hit, not a request.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::{FailureReason, FetchError, TransportError};
use crate::models::{FetchMetrics, MetricsSnapshot};
use crate::services::http_transport::HttpTransport;
use crate::services::response_cache::ResponseCache;

/// Wait after a timed-out attempt
pub const TIMEOUT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Wait after an unexpected transport failure
pub const ERROR_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Backoff exponent cap (2^6 = 64s)
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Fetcher behaviour knobs
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub cache_enabled: bool,
    pub cache_duration: Duration,
    /// Total attempts per fetch
    pub max_retries: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_duration: Duration::from_secs(crate::config::DEFAULT_CACHE_DURATION_SECS),
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Wait before the attempt following a 429 on `attempt` (0-based)
pub fn rate_limit_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(MAX_BACKOFF_EXPONENT))
}

/// Cached, retrying fetcher
///
/// Owns its cache and metrics; share it behind an `Arc` across tasks.
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    cache: ResponseCache,
    metrics: FetchMetrics,
    settings: FetchSettings,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: FetchSettings) -> Self {
        Self {
            transport,
            cache: ResponseCache::new(settings.cache_duration),
            metrics: FetchMetrics::new(),
            settings,
        }
    }

    /// Fetch `url`, from cache when fresh
    ///
    /// # Errors
    /// [`FetchError::RetriesExhausted`] when every attempt failed. Callers
    /// treat this as "no content" rather than a fatal condition.
    pub async fn fetch(&self, url: &str) -> Result<Arc<str>, FetchError> {
        if self.settings.cache_enabled {
            if let Some(payload) = self.cache.get_fresh(url) {
                self.metrics.record_cache_hit();
                debug!(url = %url, "Cache hit");
                return Ok(payload);
            }
        }

        let attempts = self.settings.max_retries;
        let mut last = FailureReason::Transport("no attempt made".to_string());

        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;

            let wait = match self.transport.get(url).await {
                Ok(response) if response.status == 200 => {
                    self.metrics.record_request();
                    let payload: Arc<str> = Arc::from(response.body);
                    if self.settings.cache_enabled {
                        self.cache.insert(url, Arc::clone(&payload));
                    }
                    if attempt > 0 {
                        debug!(url = %url, attempt = attempt + 1, "Fetch succeeded after retry");
                    }
                    return Ok(payload);
                }
                Ok(response) if response.status == 429 => {
                    self.metrics.record_rate_limited();
                    let wait = rate_limit_backoff(attempt);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        wait_secs = wait.as_secs(),
                        "Rate limited, backing off"
                    );
                    last = FailureReason::RateLimited;
                    Some(wait)
                }
                Ok(response) => {
                    warn!(url = %url, status = response.status, attempt = attempt + 1, "HTTP error");
                    last = FailureReason::HttpStatus(response.status);
                    None
                }
                Err(TransportError::Timeout) => {
                    self.metrics.record_timeout();
                    warn!(url = %url, attempt = attempt + 1, "Request timed out");
                    last = FailureReason::Timeout;
                    Some(TIMEOUT_RETRY_DELAY)
                }
                Err(e) => {
                    self.metrics.record_error();
                    error!(url = %url, attempt = attempt + 1, error = %e, "Fetch failed");
                    last = FailureReason::Transport(e.to_string());
                    Some(ERROR_RETRY_DELAY)
                }
            };

            if let (Some(wait), false) = (wait, is_last) {
                tokio::time::sleep(wait).await;
            }
        }

        warn!(url = %url, attempts, last = %last, "Giving up on fetch");
        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last,
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Zero the metrics; cache contents are kept
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}
