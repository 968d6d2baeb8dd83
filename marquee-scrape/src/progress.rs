//! Console progress bar driven by run events

use marquee_common::events::{EventBus, ScrapeEvent};
use std::io::Write;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::warn;

/// Bar width in cells
pub const BAR_LENGTH: usize = 50;

/// Render one progress line, e.g. `Top Rated: [■■■   ] 60% (15/25)`
pub fn render_bar(label: &str, completed: usize, total: usize, width: usize) -> String {
    let fraction = if total == 0 {
        1.0
    } else {
        (completed.min(total) as f64) / (total as f64)
    };
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "{}: [{}{}] {}% ({}/{})",
        label,
        "■".repeat(filled),
        " ".repeat(width - filled),
        (fraction * 100.0) as u32,
        completed,
        total
    )
}

/// Draw progress events on stderr until the run completes
pub fn spawn_console_progress(events: &EventBus) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ScrapeEvent::EnrichmentProgress {
                    label,
                    completed,
                    total,
                    ..
                }) => {
                    let mut stderr = std::io::stderr().lock();
                    let _ = write!(stderr, "\r{}", render_bar(&label, completed, total, BAR_LENGTH));
                    if completed >= total {
                        let _ = writeln!(stderr);
                    }
                    let _ = stderr.flush();
                }
                Ok(ScrapeEvent::RunCompleted { .. }) | Err(RecvError::Closed) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
            }
        }
    })
}

/// Wait for the progress task; false if it panicked or was aborted
pub async fn finish_progress(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Progress display task failed");
            false
        }
    }
}
