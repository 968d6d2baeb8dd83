//! Chart listing parser
//!
//! Turns a chart page into seed [`Movie`] records in page order.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::{element_text, selector};
use crate::error::ExtractionError;
use crate::models::{ListingKind, Movie, ReleaseYear};

/// Compiled selectors for chart pages
pub struct ListingParser {
    base_url: Url,
    item: Selector,
    title: Selector,
    metadata: Selector,
    rating: Selector,
    link: Selector,
    rank_prefix: Regex,
    number: Regex,
}

impl ListingParser {
    pub fn new(base_url: &str) -> Result<Self, ExtractionError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ExtractionError::Malformed(format!("base url {}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            item: selector("li.ipc-metadata-list-summary-item")?,
            title: selector("h3.ipc-title__text")?,
            metadata: selector("span.cli-title-metadata-item")?,
            rating: selector("span.ipc-rating-star--imdb")?,
            link: selector("a.ipc-title-link-wrapper")?,
            rank_prefix: Regex::new(r"^\d+\.\s+")
                .map_err(|e| ExtractionError::Malformed(e.to_string()))?,
            number: Regex::new(r"[\d.]+").map_err(|e| ExtractionError::Malformed(e.to_string()))?,
        })
    }

    /// Parse every chart item; rank is the 1-based item position
    ///
    /// # Errors
    /// [`ExtractionError::MissingField`] when the page has no chart items at
    /// all, which usually means the markup changed.
    pub fn parse(&self, html: &str, kind: ListingKind) -> Result<Vec<Movie>, ExtractionError> {
        let document = Html::parse_document(html);
        let items: Vec<_> = document.select(&self.item).collect();

        if items.is_empty() {
            return Err(ExtractionError::MissingField("chart items"));
        }

        let mut movies = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let rank = index as u32 + 1;
            match self.parse_item(item, rank, kind) {
                Some(movie) => movies.push(movie),
                None => warn!(rank, listing = %kind, "Skipping malformed chart item"),
            }
        }

        debug!(listing = %kind, count = movies.len(), "Parsed chart page");
        Ok(movies)
    }

    fn parse_item(&self, item: scraper::ElementRef<'_>, rank: u32, kind: ListingKind) -> Option<Movie> {
        let title = item
            .select(&self.title)
            .next()
            .map(element_text)
            .map(|t| self.rank_prefix.replace(&t, "").into_owned());

        let url = item
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| self.base_url.join(href).ok())
            .map(String::from);

        if title.is_none() && url.is_none() {
            return None;
        }

        let year = item
            .select(&self.metadata)
            .next()
            .map(|e| ReleaseYear::parse(&element_text(e)))
            .unwrap_or_else(|| ReleaseYear::Unknown("Unknown".to_string()));

        let rating = item
            .select(&self.rating)
            .next()
            .map(element_text)
            .and_then(|text| self.number.find(&text).map(|m| m.as_str().to_string()))
            .and_then(|n| n.parse::<f32>().ok())
            .unwrap_or(0.0);

        Some(Movie::seed(
            rank,
            title.unwrap_or_else(|| "Unknown Title".to_string()),
            year,
            rating,
            url,
            kind,
        ))
    }
}
