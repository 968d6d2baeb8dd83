//! Fetcher cache and retry behaviour against a scripted site

mod helpers;

use helpers::{FakeSite, Reply};
use marquee_scrape::error::FailureReason;
use marquee_scrape::services::{FetchSettings, Fetcher};
use std::sync::Arc;
use std::time::Duration;

const URL: &str = "https://movies.test/title/tt0000001/";

fn settings(cache_secs: u64) -> FetchSettings {
    FetchSettings {
        cache_enabled: true,
        cache_duration: Duration::from_secs(cache_secs),
        max_retries: 3,
    }
}

#[tokio::test(start_paused = true)]
async fn second_fetch_within_window_is_cache_hit() {
    let site = Arc::new(FakeSite::new());
    site.route(URL, Reply::Ok("<html>first</html>".into()));
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    let first = fetcher.fetch(URL).await.unwrap();
    let second = fetcher.fetch(URL).await.unwrap();

    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(site.calls(URL), 1);

    let metrics = fetcher.metrics();
    assert_eq!(metrics.requests_made, 1);
    assert_eq!(metrics.cache_hits, 1);
}

#[tokio::test(start_paused = true)]
async fn stale_entry_is_refetched_and_overwritten() {
    let site = Arc::new(FakeSite::new());
    site.once(URL, Reply::Ok("old".into()));
    site.route(URL, Reply::Ok("new".into()));
    let fetcher = Fetcher::new(site.clone(), settings(60));

    assert_eq!(&*fetcher.fetch(URL).await.unwrap(), "old");

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(&*fetcher.fetch(URL).await.unwrap(), "new");

    // The refreshed entry is served from cache again
    assert_eq!(&*fetcher.fetch(URL).await.unwrap(), "new");

    assert_eq!(site.calls(URL), 2);
    let metrics = fetcher.metrics();
    assert_eq!(metrics.requests_made, 2);
    assert_eq!(metrics.cache_hits, 1);
}

#[tokio::test(start_paused = true)]
async fn zero_cache_duration_never_hits() {
    let site = Arc::new(FakeSite::new());
    site.route(URL, Reply::Ok("body".into()));
    let fetcher = Fetcher::new(site.clone(), settings(0));

    for _ in 0..4 {
        fetcher.fetch(URL).await.unwrap();
    }

    let metrics = fetcher.metrics();
    assert_eq!(metrics.requests_made, 4);
    assert_eq!(metrics.cache_hits, 0);
    assert_eq!(site.calls(URL), 4);
}

#[tokio::test(start_paused = true)]
async fn three_timeouts_exhaust_retries() {
    let site = Arc::new(FakeSite::new());
    site.route(URL, Reply::Timeout);
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    let err = fetcher.fetch(URL).await.unwrap_err();

    assert_eq!(site.calls(URL), 3);
    assert_eq!(err.last_reason(), &FailureReason::Timeout);
    let metrics = fetcher.metrics();
    assert_eq!(metrics.timeouts, 3);
    assert_eq!(metrics.errors, 0);
    assert_eq!(metrics.requests_made, 0);
    assert!(fetcher.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timeout_then_success_waits_one_second() {
    let site = Arc::new(FakeSite::new());
    site.once(URL, Reply::Timeout);
    site.route(URL, Reply::Ok("late".into()));
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    let start = tokio::time::Instant::now();
    assert_eq!(&*fetcher.fetch(URL).await.unwrap(), "late");

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_exhaustion_reports_last_reason() {
    let site = Arc::new(FakeSite::new());
    site.route(URL, Reply::Status(429));
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    let start = tokio::time::Instant::now();
    let err = fetcher.fetch(URL).await.unwrap_err();

    assert_eq!(err.last_reason(), &FailureReason::RateLimited);
    // Backoff of 1s and 2s between the three attempts, none after the last
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(fetcher.metrics().rate_limited, 3);
}

#[tokio::test(start_paused = true)]
async fn connection_errors_count_as_errors() {
    let site = Arc::new(FakeSite::new());
    site.route(URL, Reply::Error("connection refused".into()));
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    assert!(fetcher.fetch(URL).await.is_err());
    assert_eq!(fetcher.metrics().errors, 3);
}

#[tokio::test(start_paused = true)]
async fn not_found_is_retried_like_other_statuses() {
    let site = Arc::new(FakeSite::new());
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    let err = fetcher.fetch("https://movies.test/missing").await.unwrap_err();

    assert_eq!(site.calls("https://movies.test/missing"), 3);
    assert_eq!(err.last_reason(), &FailureReason::HttpStatus(404));
}

#[tokio::test(start_paused = true)]
async fn reset_metrics_keeps_cache() {
    let site = Arc::new(FakeSite::new());
    site.route(URL, Reply::Ok("x".into()));
    let fetcher = Fetcher::new(site.clone(), settings(3600));

    fetcher.fetch(URL).await.unwrap();
    fetcher.reset_metrics();
    fetcher.fetch(URL).await.unwrap();

    let metrics = fetcher.metrics();
    assert_eq!(metrics.requests_made, 0);
    assert_eq!(metrics.cache_hits, 1);
}
