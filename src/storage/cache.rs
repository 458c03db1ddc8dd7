// src/storage/cache.rs

//! Item cache with lazy, single-flight refresh.
//!
//! ## Policy
//!
//! - A snapshot younger than the TTL is served without touching the network.
//! - A stale snapshot triggers one refresh; readers arriving while it is in
//!   flight get the previous snapshot immediately.
//! - A failed refresh keeps the previous snapshot and marks the cache
//!   degraded. Further attempts wait at least `retry_secs`.
//! - Before the first successful refresh the cache is `Uninitialized`;
//!   readers wait for the in-flight attempt instead of getting an empty feed.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::error::{AppError, NetworkErrorKind, Result};
use crate::models::{Config, FeedSnapshot, HealthStatus};
use crate::services::{Extractor, PageFetcher};

/// What a reader gets from [`ItemCache::get_current`].
#[derive(Debug, Clone)]
pub enum CacheRead {
    /// The current (possibly stale) snapshot
    Snapshot(Arc<FeedSnapshot>),
    /// No refresh has ever succeeded
    Uninitialized,
}

impl CacheRead {
    pub fn snapshot(self) -> Option<Arc<FeedSnapshot>> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            Self::Uninitialized => None,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }
}

impl From<Option<Arc<FeedSnapshot>>> for CacheRead {
    fn from(snapshot: Option<Arc<FeedSnapshot>>) -> Self {
        snapshot.map_or(Self::Uninitialized, Self::Snapshot)
    }
}

/// Observable cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Fresh,
    Stale,
    Refreshing,
    StaleButServing,
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: Option<Arc<FeedSnapshot>>,
    last_failure_at: Option<DateTime<Utc>>,
    /// Completed refresh attempts, successful or not
    attempts: u64,
}

/// Owns the current [`FeedSnapshot`] and refreshes it on demand.
pub struct ItemCache {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Extractor,
    source_url: String,
    fetch_timeout: Duration,
    ttl: TimeDelta,
    retry_after: TimeDelta,
    service_name: String,
    inner: RwLock<Inner>,
    refresh_lock: Mutex<()>,
}

impl ItemCache {
    /// Create an empty cache for the configured source page.
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: Extractor, config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor,
            source_url: config.fetcher.source_url.clone(),
            fetch_timeout: config.fetcher.timeout(),
            ttl: to_delta(config.cache.ttl(), "cache.ttl_secs")?,
            retry_after: to_delta(config.cache.retry_after(), "cache.retry_secs")?,
            service_name: config.feed.service_name.clone(),
            inner: RwLock::new(Inner::default()),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Return the snapshot to serve, refreshing first if it is due.
    pub async fn get_current(&self) -> CacheRead {
        let (snapshot, attempts, due) = {
            let inner = self.read();
            (
                inner.snapshot.clone(),
                inner.attempts,
                self.refresh_due(&inner, Utc::now()),
            )
        };

        if !due {
            return snapshot.into();
        }

        match snapshot {
            Some(previous) => {
                let Ok(_guard) = self.refresh_lock.try_lock() else {
                    log::debug!("Refresh already in flight, serving previous snapshot");
                    return CacheRead::Snapshot(previous);
                };
                self.refresh_unless_done(attempts).await
            }
            None => {
                let _guard = self.refresh_lock.lock().await;
                self.refresh_unless_done(attempts).await
            }
        }
    }

    /// Liveness view for the health endpoint.
    pub fn health(&self) -> HealthStatus {
        let inner = self.read();
        HealthStatus {
            healthy: inner.last_failure_at.is_none(),
            last_success_at: inner.snapshot.as_ref().map(|s| s.fetched_at),
            service_name: self.service_name.clone(),
        }
    }

    pub fn state(&self) -> CacheState {
        if self.refresh_lock.try_lock().is_err() {
            return CacheState::Refreshing;
        }

        let inner = self.read();
        match &inner.snapshot {
            None => CacheState::Uninitialized,
            Some(_) if inner.last_failure_at.is_some() => CacheState::StaleButServing,
            Some(snapshot) if snapshot.age(Utc::now()) >= self.ttl => CacheState::Stale,
            Some(_) => CacheState::Fresh,
        }
    }

    fn refresh_due(&self, inner: &Inner, now: DateTime<Utc>) -> bool {
        if let Some(failed_at) = inner.last_failure_at {
            if now - failed_at < self.retry_after {
                return false;
            }
        }
        match &inner.snapshot {
            None => true,
            Some(snapshot) => snapshot.age(now) >= self.ttl,
        }
    }

    /// Must be called with `refresh_lock` held. Skips the fetch when another
    /// caller completed a refresh after `seen_attempts` was read.
    async fn refresh_unless_done(&self, seen_attempts: u64) -> CacheRead {
        let already_done = self.read().attempts != seen_attempts;
        if !already_done {
            self.refresh().await;
        }
        self.read().snapshot.clone().into()
    }

    async fn refresh(&self) {
        let outcome = self.fetch_and_extract().await;

        let mut inner = self.write();
        inner.attempts += 1;
        match outcome {
            Ok(snapshot) => {
                log::info!(
                    "Refreshed feed from {}: {} items",
                    snapshot.source_url,
                    snapshot.items.len()
                );
                inner.snapshot = Some(Arc::new(snapshot));
                inner.last_failure_at = None;
            }
            Err(e) => {
                match &inner.snapshot {
                    Some(previous) => log::warn!(
                        "Refresh failed, serving snapshot from {}: {}",
                        previous.fetched_at.to_rfc3339(),
                        e
                    ),
                    None => log::error!("Initial refresh failed, no feed available yet: {}", e),
                }
                inner.last_failure_at = Some(Utc::now());
            }
        }
    }

    async fn fetch_and_extract(&self) -> Result<FeedSnapshot> {
        // Bound the call regardless of the fetcher implementation.
        let markup = tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(&self.source_url, self.fetch_timeout),
        )
        .await
        .map_err(|_| {
            AppError::network(
                &self.source_url,
                NetworkErrorKind::Timeout,
                format!("no response within {:?}", self.fetch_timeout),
            )
        })??;

        let fetched_at = Utc::now();
        let items = self.extractor.extract_at(&markup, fetched_at)?;
        Ok(FeedSnapshot::new(items, fetched_at, self.source_url.clone()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_delta(duration: Duration, field: &str) -> Result<TimeDelta> {
    TimeDelta::from_std(duration).map_err(|e| AppError::config(format!("{field} out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{BRIEFING_PAGE, REDESIGNED_PAGE, ScriptedFetcher};

    const SOURCE: &str = "https://source.test/briefing";

    fn cache_with(fetcher: Arc<ScriptedFetcher>, ttl_secs: u64, retry_secs: u64) -> ItemCache {
        let mut config = Config::default();
        config.fetcher.source_url = SOURCE.to_string();
        config.fetcher.timeout_secs = 1;
        config.cache.ttl_secs = ttl_secs;
        config.cache.retry_secs = retry_secs;
        let extractor = Extractor::new(&config.extractor, SOURCE).unwrap();
        ItemCache::new(fetcher, extractor, &config).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_cache_does_not_fetch() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![ScriptedFetcher::ok(BRIEFING_PAGE)]));
        let cache = cache_with(fetcher.clone(), 3600, 60);

        let first = cache.get_current().await.snapshot().unwrap();
        let second = cache.get_current().await.snapshot().unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].link(), "https://source.test/x");
        assert_eq!(cache.state(), CacheState::Fresh);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_is_uninitialized() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![ScriptedFetcher::down()]));
        let cache = cache_with(fetcher.clone(), 3600, 60);

        assert!(cache.get_current().await.is_uninitialized());
        assert_eq!(cache.state(), CacheState::Uninitialized);

        let health = cache.health();
        assert!(!health.healthy);
        assert!(health.last_success_at.is_none());
    }

    #[tokio::test]
    async fn test_stale_cache_serves_previous_snapshot_on_network_error() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ScriptedFetcher::ok(BRIEFING_PAGE),
            ScriptedFetcher::down(),
        ]));
        let cache = cache_with(fetcher.clone(), 0, 3600);

        let first = cache.get_current().await.snapshot().unwrap();
        let second = cache.get_current().await.snapshot().unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.state(), CacheState::StaleButServing);

        let health = cache.health();
        assert!(!health.healthy);
        assert_eq!(health.label(), "degraded");
        assert_eq!(health.last_success_at, Some(first.fetched_at));
    }

    #[tokio::test]
    async fn test_stale_cache_serves_previous_snapshot_on_extract_error() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ScriptedFetcher::ok(BRIEFING_PAGE),
            ScriptedFetcher::ok(REDESIGNED_PAGE),
        ]));
        let cache = cache_with(fetcher.clone(), 0, 0);

        let first = cache.get_current().await.snapshot().unwrap();
        let second = cache.get_current().await.snapshot().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!cache.health().healthy);
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces_snapshot_and_clears_failure() {
        let updated = BRIEFING_PAGE.replace("<h3>A</h3>", "<h3>A2</h3>");
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ScriptedFetcher::ok(BRIEFING_PAGE),
            ScriptedFetcher::down(),
            ScriptedFetcher::ok(&updated),
        ]));
        let cache = cache_with(fetcher.clone(), 0, 0);

        cache.get_current().await;
        cache.get_current().await;
        assert!(!cache.health().healthy);

        let latest = cache.get_current().await.snapshot().unwrap();
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(latest.items[0].title(), "A2");
        assert!(cache.health().healthy);
    }

    #[tokio::test]
    async fn test_retry_window_suppresses_refetch_after_failure() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            ScriptedFetcher::ok(BRIEFING_PAGE),
            ScriptedFetcher::down(),
        ]));
        let cache = cache_with(fetcher.clone(), 0, 3600);

        cache.get_current().await;
        cache.get_current().await;
        cache.get_current().await;
        assert!(cache.get_current().await.snapshot().is_some());

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_stale_readers_share_one_refresh() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![
                ScriptedFetcher::ok(BRIEFING_PAGE),
                ScriptedFetcher::ok(BRIEFING_PAGE),
            ])
            .with_delay(Duration::from_millis(100)),
        );
        let cache = cache_with(fetcher.clone(), 0, 0);
        let initial = cache.get_current().await.snapshot().unwrap();

        let (refreshed, served) = tokio::join!(cache.get_current(), cache.get_current());

        assert_eq!(fetcher.calls(), 2);
        assert!(!Arc::ptr_eq(&refreshed.snapshot().unwrap(), &initial));
        assert!(Arc::ptr_eq(&served.snapshot().unwrap(), &initial));
    }

    #[tokio::test]
    async fn test_concurrent_cold_readers_wait_for_single_fetch() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![ScriptedFetcher::ok(BRIEFING_PAGE)])
                .with_delay(Duration::from_millis(100)),
        );
        let cache = cache_with(fetcher.clone(), 3600, 60);

        let (a, b) = tokio::join!(cache.get_current(), cache.get_current());

        assert_eq!(fetcher.calls(), 1);
        assert!(Arc::ptr_eq(&a.snapshot().unwrap(), &b.snapshot().unwrap()));
    }

    #[tokio::test]
    async fn test_slow_fetcher_is_cut_off_by_timeout() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(vec![ScriptedFetcher::ok(BRIEFING_PAGE)])
                .with_delay(Duration::from_secs(5)),
        );
        let cache = cache_with(fetcher.clone(), 3600, 60);

        let started = std::time::Instant::now();
        assert!(cache.get_current().await.is_uninitialized());
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
