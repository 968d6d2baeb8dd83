//! marquee-scrape library interface
//!
//! Chart scraping with bounded concurrent detail enrichment, a time-based
//! response cache and retry with backoff around every fetch.

pub mod cli;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod progress;
pub mod services;
pub mod sink;

pub use crate::config::ScraperConfig;
pub use crate::error::{ExtractionError, FetchError, SinkError, TransportError};
pub use crate::services::{EnrichmentOrchestrator, Fetcher, Scraper};
