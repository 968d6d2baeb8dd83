//! HTML extraction for chart listings and title detail pages
//!
//! Selectors track the current site markup and carry no guarantee beyond
//! "worked when written". Failures surface as [`ExtractionError`]s so the
//! pipeline can keep the listing data.
//!
//! [`ExtractionError`]: crate::error::ExtractionError

pub mod listing_parser;
pub mod movie_details;

pub use listing_parser::ListingParser;
pub use movie_details::MovieDetailExtractor;

use scraper::Selector;

use crate::error::ExtractionError;

/// Compile a CSS selector, mapping failure into [`ExtractionError`]
pub(crate) fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector(format!("{}: {}", css, e)))
}

/// Whitespace-collapsed text content of an element
pub(crate) fn element_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
