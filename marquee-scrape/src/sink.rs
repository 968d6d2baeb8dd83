//! Tabular output
//!
//! Writes the enriched records to a CSV file and the run metrics to a
//! `<stem>_summary.csv` file alongside it.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::SinkError;
use crate::models::{MetricsSnapshot, Movie};

const NOT_AVAILABLE: &str = "N/A";

const RECORD_HEADER: [&str; 9] = [
    "List", "Rank", "Title", "Year", "Rating", "Genres", "Director", "Stars", "Plot",
];

/// Run-level figures for the summary table
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub duration: Duration,
    pub metrics: MetricsSnapshot,
    pub top_count: usize,
    pub popular_count: usize,
    pub generated_at: DateTime<Local>,
}

/// Files produced by [`write_results`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub records: PathBuf,
    pub summary: PathBuf,
}

/// Path of the summary table for a records file
pub fn summary_path(records_path: &Path) -> PathBuf {
    let stem = records_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "marquee".to_string());
    records_path.with_file_name(format!("{}_summary.csv", stem))
}

/// Write both tables
///
/// # Errors
/// [`SinkError::NoData`] when both lists are empty; I/O and CSV errors
/// otherwise. No partial-file cleanup is attempted.
pub fn write_results(
    path: &Path,
    top: &[Movie],
    popular: &[Movie],
    summary: &RunSummary,
) -> Result<OutputFiles, SinkError> {
    if top.is_empty() && popular.is_empty() {
        return Err(SinkError::NoData);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(path = %path.display(), "Saving movies");

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RECORD_HEADER)?;
    for movie in top.iter().chain(popular) {
        writer.write_record(record_row(movie))?;
    }
    writer.flush()?;

    let summary_file = summary_path(path);
    let mut writer = csv::Writer::from_path(&summary_file)?;
    writer.write_record(["Metric", "Value"])?;
    for (label, value) in summary_rows(summary) {
        writer.write_record([label, value.as_str()])?;
    }
    writer.flush()?;

    info!(
        records = %path.display(),
        summary = %summary_file.display(),
        "Output written"
    );

    Ok(OutputFiles {
        records: path.to_path_buf(),
        summary: summary_file,
    })
}

fn join_or_na(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(", ")
    }
}

fn record_row(movie: &Movie) -> [String; 9] {
    [
        movie.listing.label().to_string(),
        movie.rank.to_string(),
        movie.title.clone(),
        movie.year.to_string(),
        format!("{:.1}", movie.rating),
        join_or_na(&movie.genres),
        movie.director.clone().unwrap_or_else(|| "Unknown".to_string()),
        join_or_na(&movie.stars),
        movie.plot.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ]
}

fn summary_rows(summary: &RunSummary) -> Vec<(&'static str, String)> {
    vec![
        (
            "Total Duration (seconds)",
            format!("{:.2}", summary.duration.as_secs_f64()),
        ),
        ("Requests Made", summary.metrics.requests_made.to_string()),
        ("Cache Hits", summary.metrics.cache_hits.to_string()),
        ("Errors", summary.metrics.errors.to_string()),
        ("Top Movies Count", summary.top_count.to_string()),
        ("Popular Movies Count", summary.popular_count.to_string()),
        (
            "Total Movies",
            (summary.top_count + summary.popular_count).to_string(),
        ),
        (
            "Generated At",
            summary.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingKind, ReleaseYear};

    #[test]
    fn test_summary_path() {
        assert_eq!(
            summary_path(Path::new("out/movies.csv")),
            PathBuf::from("out/movies_summary.csv")
        );
        assert_eq!(
            summary_path(Path::new("movies")),
            PathBuf::from("movies_summary.csv")
        );
    }

    #[test]
    fn test_unenriched_row_uses_placeholders() {
        let movie = Movie::seed(
            7,
            "Seven",
            ReleaseYear::Known(1995),
            8.6,
            None,
            ListingKind::Popular,
        );
        let row = record_row(&movie);
        assert_eq!(row[0], "Popular/Trending");
        assert_eq!(row[1], "7");
        assert_eq!(row[4], "8.6");
        assert_eq!(row[5], "N/A");
        assert_eq!(row[6], "Unknown");
        assert_eq!(row[7], "N/A");
        assert_eq!(row[8], "N/A");
    }
}
