//! Command-line arguments
//!
//! Every scrape option can also come from a `MARQUEE_*` environment
//! variable; values given neither way fall through to the config file.

use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Command-line arguments for marquee-scrape
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "marquee-scrape")]
#[command(about = "Scrape movie charts, enrich them from title pages, write a CSV report")]
#[command(version)]
pub struct Args {
    /// Config file (default: <config dir>/marquee/config.toml if present)
    #[arg(short, long, env = "MARQUEE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output CSV file; the summary goes to <stem>_summary.csv
    #[arg(short, long, env = "MARQUEE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "MARQUEE_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Maximum detail fetches in flight
    #[arg(short = 'j', long, env = "MARQUEE_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Records per enrichment batch
    #[arg(long, env = "MARQUEE_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Delay between batches in milliseconds
    #[arg(long, env = "MARQUEE_BATCH_DELAY_MS")]
    pub batch_delay_ms: Option<u64>,

    /// Attempts per fetch
    #[arg(long, env = "MARQUEE_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Cache validity in seconds (0 disables cache hits)
    #[arg(long, env = "MARQUEE_CACHE_SECS")]
    pub cache_secs: Option<u64>,

    /// Disable the response cache
    #[arg(long, env = "MARQUEE_NO_CACHE")]
    pub no_cache: bool,

    /// Records per chart to enrich (0 = all)
    #[arg(short = 'n', long, env = "MARQUEE_DETAILS_LIMIT")]
    pub details_limit: Option<usize>,

    /// Skip title-page enrichment
    #[arg(long, env = "MARQUEE_NO_DETAILS")]
    pub no_details: bool,

    /// Custom user agent
    #[arg(long, env = "MARQUEE_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Site root the chart paths are appended to
    #[arg(long, env = "MARQUEE_BASE_URL")]
    pub base_url: Option<String>,

    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long, env = "MARQUEE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Scrape settings given on the command line or in the environment
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            request_timeout_secs: self.timeout,
            concurrency_limit: self.concurrency,
            batch_size: self.batch_size,
            cache_enabled: self.no_cache.then_some(false),
            cache_duration_secs: self.cache_secs,
            max_retries: self.max_retries,
            output: self.output.clone(),
            details_limit: self.details_limit,
            include_details: self.no_details.then_some(false),
            batch_delay_ms: self.batch_delay_ms,
            user_agent: self.user_agent.clone(),
            base_url: self.base_url.clone(),
        }
    }
}
