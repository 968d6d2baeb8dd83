//! Scraper configuration
//!
//! Resolves the effective [`ScraperConfig`] from command-line/environment
//! overrides, the `[scrape]` table of the TOML config, and compiled defaults.

use marquee_common::config::ScrapeSection;
use marquee_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 25;
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 3600;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_DETAILS_LIMIT: usize = 100;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 500;
pub const DEFAULT_OUTPUT: &str = "marquee_movies.csv";
pub const DEFAULT_BASE_URL: &str = "https://www.imdb.com";

/// Effective settings for one scrape run
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Duration,
    /// Maximum detail fetches in flight across the whole run
    pub concurrency_limit: usize,
    /// Records per enrichment batch
    pub batch_size: usize,
    pub cache_enabled: bool,
    /// Validity window of a cached response; zero disables cache hits
    pub cache_duration: Duration,
    /// Attempts per fetch (not retries after the first)
    pub max_retries: u32,
    pub output: PathBuf,
    /// Records per list that get detail-fetched; `None` enriches all
    pub details_limit: Option<usize>,
    pub include_details: bool,
    /// Courtesy pause between enrichment batches
    pub batch_delay: Duration,
    pub user_agent: String,
    pub base_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_enabled: true,
            cache_duration: Duration::from_secs(DEFAULT_CACHE_DURATION_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            output: PathBuf::from(DEFAULT_OUTPUT),
            details_limit: Some(DEFAULT_DETAILS_LIMIT),
            include_details: true,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            user_agent: default_user_agent(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("marquee/{}", env!("CARGO_PKG_VERSION"))
}

/// Highest-priority settings (command line, environment)
///
/// Same shape as the TOML `[scrape]` table so both tiers merge field by field.
pub type ConfigOverrides = ScrapeSection;

impl ScraperConfig {
    /// Merge overrides over file settings over defaults, then validate
    pub fn resolve(overrides: &ConfigOverrides, file: &ScrapeSection) -> Result<Self> {
        let defaults = Self::default();

        macro_rules! pick {
            ($field:ident) => {
                overrides.$field.clone().or_else(|| file.$field.clone())
            };
        }

        let details_limit = match pick!(details_limit) {
            Some(0) => None,
            Some(n) => Some(n),
            None => defaults.details_limit,
        };

        let config = Self {
            request_timeout: pick!(request_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            concurrency_limit: pick!(concurrency_limit).unwrap_or(defaults.concurrency_limit),
            batch_size: pick!(batch_size).unwrap_or(defaults.batch_size),
            cache_enabled: pick!(cache_enabled).unwrap_or(defaults.cache_enabled),
            cache_duration: pick!(cache_duration_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_duration),
            max_retries: pick!(max_retries).unwrap_or(defaults.max_retries),
            output: pick!(output).unwrap_or(defaults.output),
            details_limit,
            include_details: pick!(include_details).unwrap_or(defaults.include_details),
            batch_delay: pick!(batch_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.batch_delay),
            user_agent: pick!(user_agent).unwrap_or(defaults.user_agent),
            base_url: pick!(base_url)
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(Error::Config("concurrency_limit must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(Error::Config(format!("Invalid base_url: {}", self.base_url)));
        }
        Ok(())
    }

    /// URL of the top-rated chart
    pub fn top_rated_url(&self) -> String {
        format!("{}/chart/top/", self.base_url)
    }

    /// URL of the most-popular chart
    pub fn popular_url(&self) -> String {
        format!("{}/chart/moviemeter/", self.base_url)
    }

    /// Fetcher settings derived from this config
    pub fn fetch_settings(&self) -> crate::services::fetcher::FetchSettings {
        crate::services::fetcher::FetchSettings {
            cache_enabled: self.cache_enabled,
            cache_duration: self.cache_duration,
            max_retries: self.max_retries,
        }
    }

    /// Orchestrator settings derived from this config
    pub fn enrich_settings(&self) -> crate::services::enrichment_orchestrator::EnrichSettings {
        crate::services::enrichment_orchestrator::EnrichSettings {
            concurrency_limit: self.concurrency_limit,
            batch_size: self.batch_size,
            batch_delay: self.batch_delay,
            details_limit: self.details_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ScraperConfig::resolve(&ConfigOverrides::default(), &ScrapeSection::default())
            .unwrap();
        assert_eq!(config.concurrency_limit, 10);
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.cache_duration, Duration::from_secs(3600));
        assert_eq!(config.details_limit, Some(100));
        assert!(config.cache_enabled);
    }

    #[test]
    fn test_override_beats_file() {
        let overrides = ConfigOverrides {
            concurrency_limit: Some(4),
            ..Default::default()
        };
        let file = ScrapeSection {
            concurrency_limit: Some(15),
            batch_size: Some(5),
            ..Default::default()
        };

        let config = ScraperConfig::resolve(&overrides, &file).unwrap();
        assert_eq!(config.concurrency_limit, 4);
        assert_eq!(config.batch_size, 5);
    }

    #[test]
    fn test_zero_details_limit_means_unlimited() {
        let overrides = ConfigOverrides {
            details_limit: Some(0),
            ..Default::default()
        };
        let config = ScraperConfig::resolve(&overrides, &ScrapeSection::default()).unwrap();
        assert_eq!(config.details_limit, None);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let overrides = ConfigOverrides {
            concurrency_limit: Some(0),
            ..Default::default()
        };
        let result = ScraperConfig::resolve(&overrides, &ScrapeSection::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_cache_duration_is_valid() {
        let file = ScrapeSection {
            cache_duration_secs: Some(0),
            ..Default::default()
        };
        let config = ScraperConfig::resolve(&ConfigOverrides::default(), &file).unwrap();
        assert!(config.cache_duration.is_zero());
    }

    #[test]
    fn test_chart_urls_from_base() {
        let overrides = ConfigOverrides {
            base_url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };
        let config = ScraperConfig::resolve(&overrides, &ScrapeSection::default()).unwrap();
        assert_eq!(config.top_rated_url(), "http://localhost:8080/chart/top/");
        assert_eq!(config.popular_url(), "http://localhost:8080/chart/moviemeter/");
    }
}
