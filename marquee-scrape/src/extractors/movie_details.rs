//! Title detail page extractor

use scraper::{Html, Selector};

use super::{element_text, selector};
use crate::error::ExtractionError;
use crate::models::Movie;
use crate::services::enrichment_orchestrator::DetailExtractor;

/// Cast members kept per movie
pub const MAX_STARS: usize = 3;

/// Fills genres, director, stars and plot from a title page
pub struct MovieDetailExtractor {
    genre: Selector,
    credit_link: Selector,
    cast_item: Selector,
    actor: Selector,
    plot: Selector,
}

impl MovieDetailExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            genre: selector("div.ipc-chip-list a.ipc-chip")?,
            credit_link: selector("a.ipc-metadata-list-item__list-content-item")?,
            cast_item: selector(r#"div[data-testid="title-cast-item"]"#)?,
            actor: selector(r#"a[data-testid="title-cast-item__actor"]"#)?,
            plot: selector(r#"span[data-testid="plot-xl"]"#)?,
        })
    }
}

impl DetailExtractor<Movie> for MovieDetailExtractor {
    fn name(&self) -> &'static str {
        "title-page"
    }

    fn enrich(&self, mut movie: Movie, content: &str) -> Result<Movie, ExtractionError> {
        let document = Html::parse_document(content);

        let genres: Vec<String> = document
            .select(&self.genre)
            .map(element_text)
            .filter(|g| !g.is_empty())
            .collect();

        // Person links carry an /name/nm... href
        let director = document
            .select(&self.credit_link)
            .find(|a| a.value().attr("href").is_some_and(|href| href.contains("nm")))
            .map(element_text)
            .filter(|d| !d.is_empty());

        let stars: Vec<String> = document
            .select(&self.cast_item)
            .take(MAX_STARS)
            .filter_map(|item| item.select(&self.actor).next())
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect();

        let plot = document
            .select(&self.plot)
            .next()
            .map(element_text)
            .filter(|p| !p.is_empty());

        if genres.is_empty() && director.is_none() && stars.is_empty() && plot.is_none() {
            return Err(ExtractionError::MissingField("genres, director, stars and plot"));
        }

        movie.genres = genres;
        movie.director = director;
        movie.stars = stars;
        movie.plot = plot;
        Ok(movie)
    }
}
