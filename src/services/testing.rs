//! Test doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::PageFetcher;
use crate::error::{AppError, FetchResult, NetworkErrorKind};

pub const BRIEFING_PAGE: &str = r#"<html><body>
<div class="briefing-item"><h3>A</h3><a href="/x">A</a><p>Summary A</p></div>
<div class="briefing-item"><h3>B</h3><a href="/y">B</a><p>Summary B</p></div>
</body></html>"#;

pub const REDESIGNED_PAGE: &str = "<html><body><main>Nothing here</main></body></html>";

/// Fetcher that replays a fixed script of responses and counts calls.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<FetchResult>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<FetchResult>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ok(body: &str) -> FetchResult {
        Ok(body.to_string())
    }

    pub fn down() -> FetchResult {
        Err(AppError::network(
            "https://source.test/",
            NetworkErrorKind::Status(503),
            "Service Unavailable",
        ))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(AppError::network(url, NetworkErrorKind::Other, "script exhausted"))
        })
    }
}
