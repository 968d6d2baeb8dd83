//! # Marquee Common Library
//!
//! Shared code for the marquee scraping tools including:
//! - Error types
//! - Configuration file model and resolution helpers
//! - Run event types and the event bus used for progress reporting

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventBus, ScrapeEvent};
