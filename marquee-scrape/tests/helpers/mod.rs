//! Shared fixtures for marquee-scrape integration tests
//!
//! [`FakeSite`] is an in-memory [`HttpTransport`] with scripted replies per
//! URL, optional per-URL latency, and in-flight instrumentation.

#![allow(dead_code)]

use async_trait::async_trait;
use marquee_scrape::error::TransportError;
use marquee_scrape::models::{ListingKind, Movie, ReleaseYear};
use marquee_scrape::services::{HttpResponse, HttpTransport};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const BASE_URL: &str = "https://movies.test";

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(String),
    Status(u16),
    Timeout,
    Error(String),
}

/// Scripted HTTP site
///
/// Each URL has a queue of one-shot replies followed by a repeating default.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeSite {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    defaults: Mutex<HashMap<String, Reply>>,
    latency: Mutex<HashMap<String, Duration>>,
    calls: Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` on every request to `url` (after queued replies)
    pub fn route(&self, url: &str, reply: Reply) -> &Self {
        self.defaults.lock().unwrap().insert(url.to_string(), reply);
        self
    }

    /// Reply once with `reply` before falling back to the route
    pub fn once(&self, url: &str, reply: Reply) -> &Self {
        self.queued
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Delay every response for `url`
    pub fn delay(&self, url: &str, latency: Duration) -> &Self {
        self.latency.lock().unwrap().insert(url.to_string(), latency);
        self
    }

    pub fn calls(&self, url: &str) -> u32 {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    /// Highest number of requests observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> Reply {
        if let Some(reply) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }
        self.defaults
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Reply::Status(404))
    }
}

#[async_trait]
impl HttpTransport for FakeSite {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self.latency.lock().unwrap().get(url).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self.next_reply(url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Reply::Ok(body) => Ok(HttpResponse::ok(body)),
            Reply::Status(status) => Ok(HttpResponse::status(status)),
            Reply::Timeout => Err(TransportError::Timeout),
            Reply::Error(msg) => Err(TransportError::Connect(msg)),
        }
    }
}

/// Detail URL for a rank
pub fn title_url(rank: u32) -> String {
    format!("{}/title/tt{:07}/", BASE_URL, rank)
}

/// Listing seed with a detail URL
pub fn seed_movie(rank: u32) -> Movie {
    Movie::seed(
        rank,
        format!("Movie {}", rank),
        ReleaseYear::Known(1990 + rank as i32),
        8.0,
        Some(title_url(rank)),
        ListingKind::TopRated,
    )
}

/// Minimal title page the detail extractor understands
pub fn title_page(director: &str, genres: &[&str], plot: &str) -> String {
    let chips: String = genres
        .iter()
        .map(|g| format!(r#"<a class="ipc-chip" href="/search?g={g}">{g}</a>"#))
        .collect();
    format!(
        r#"<html><body>
        <span data-testid="plot-xl">{plot}</span>
        <div class="ipc-chip-list">{chips}</div>
        <a class="ipc-metadata-list-item__list-content-item" href="/name/nm0000001/">{director}</a>
        <div data-testid="title-cast-item"><a data-testid="title-cast-item__actor">Lead Actor</a></div>
        </body></html>"#
    )
}

/// Title page for a rank, director "Director <rank>"
pub fn numbered_title_page(rank: u32) -> String {
    title_page(&format!("Director {}", rank), &["Drama"], &format!("Plot {}", rank))
}

/// Chart page with one item per `(title, year, rating, href)`
pub fn chart_page(items: &[(&str, &str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .enumerate()
        .map(|(i, (title, year, rating, href))| {
            format!(
                r#"<li class="ipc-metadata-list-summary-item">
                  <a class="ipc-title-link-wrapper" href="{href}"><h3 class="ipc-title__text">{n}. {title}</h3></a>
                  <span class="cli-title-metadata-item">{year}</span>
                  <span class="ipc-rating-star--imdb">{rating}</span>
                </li>"#,
                n = i + 1
            )
        })
        .collect();
    format!("<html><body><ul>{body}</ul></body></html>")
}
