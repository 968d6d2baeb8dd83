//! Data models for marquee-scrape

pub mod metrics;
pub mod movie;

pub use metrics::{FetchMetrics, MetricsSnapshot};
pub use movie::{ListingKind, Movie, ReleaseYear};
