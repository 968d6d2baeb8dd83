//! Movie record
//!
//! Seeded by the listing parser, enriched in place by the detail extractor.
//! Enrichment fields start empty/absent and stay that way when enrichment
//! is unavailable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::services::enrichment_orchestrator::Enrichable;

/// Which chart a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    TopRated,
    Popular,
}

impl ListingKind {
    /// Human-readable label used in logs, events and output
    pub fn label(&self) -> &'static str {
        match self {
            ListingKind::TopRated => "Top Rated",
            ListingKind::Popular => "Popular/Trending",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Release year as listed
///
/// Listings occasionally show a range or placeholder instead of a year;
/// the raw text is kept rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseYear {
    Known(i32),
    Unknown(String),
}

impl ReleaseYear {
    /// Parse listing text, keeping non-numeric text verbatim
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.parse::<i32>() {
            Ok(year) if trimmed.chars().all(|c| c.is_ascii_digit()) => ReleaseYear::Known(year),
            _ if trimmed.is_empty() => ReleaseYear::Unknown("Unknown".to_string()),
            _ => ReleaseYear::Unknown(trimmed.to_string()),
        }
    }
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseYear::Known(year) => write!(f, "{}", year),
            ReleaseYear::Unknown(text) => f.write_str(text),
        }
    }
}

/// One movie from a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// 1-based position on the listing page
    pub rank: u32,
    pub title: String,
    pub year: ReleaseYear,
    /// Listing rating; 0.0 when the page shows none
    pub rating: f32,
    /// Absolute detail-page URL, if the listing linked one
    pub url: Option<String>,
    pub listing: ListingKind,

    // Enrichment fields
    pub genres: Vec<String>,
    pub director: Option<String>,
    /// Top-billed cast, at most three
    pub stars: Vec<String>,
    pub plot: Option<String>,
}

impl Movie {
    /// Listing seed with all enrichment fields empty
    pub fn seed(
        rank: u32,
        title: impl Into<String>,
        year: ReleaseYear,
        rating: f32,
        url: Option<String>,
        listing: ListingKind,
    ) -> Self {
        Self {
            rank,
            title: title.into(),
            year,
            rating,
            url,
            listing,
            genres: Vec::new(),
            director: None,
            stars: Vec::new(),
            plot: None,
        }
    }

    /// True once any enrichment field has been filled
    pub fn is_enriched(&self) -> bool {
        !self.genres.is_empty()
            || self.director.is_some()
            || !self.stars.is_empty()
            || self.plot.is_some()
    }
}

impl Enrichable for Movie {
    fn detail_key(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn label(&self) -> String {
        format!("#{} {}", self.rank, self.title)
    }
}
