//! Time-based response cache
//!
//! Entries live for the process lifetime. A stale entry is refetched and
//! overwritten on the next lookup; nothing is evicted proactively.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One cached payload
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub retrieved_at: Instant,
    pub payload: Arc<str>,
}

impl CacheEntry {
    /// Fresh while `now - retrieved_at < validity`
    pub fn is_fresh(&self, now: Instant, validity: Duration) -> bool {
        now.saturating_duration_since(self.retrieved_at) < validity
    }
}

/// URL-keyed cache of successful fetches
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    validity: Duration,
}

impl ResponseCache {
    pub fn new(validity: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            validity,
        }
    }

    /// Payload for `url` if a fresh entry exists
    pub fn get_fresh(&self, url: &str) -> Option<Arc<str>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(url)
            .filter(|entry| entry.is_fresh(Instant::now(), self.validity))
            .map(|entry| Arc::clone(&entry.payload))
    }

    /// Store or overwrite the entry for `url`
    pub fn insert(&self, url: &str, payload: Arc<str>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            url.to_string(),
            CacheEntry {
                retrieved_at: Instant::now(),
                payload,
            },
        );
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
