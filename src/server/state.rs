use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{Extractor, FeedRenderer, HttpFetcher};
use crate::storage::ItemCache;

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ItemCache>,
    pub renderer: Arc<FeedRenderer>,
    /// `Cache-Control` value sent with feed responses
    pub cache_control: Arc<str>,
}

impl AppState {
    pub fn new(cache: ItemCache, renderer: FeedRenderer, max_age_secs: u64) -> Self {
        Self {
            cache: Arc::new(cache),
            renderer: Arc::new(renderer),
            cache_control: format!("public, max-age={max_age_secs}").into(),
        }
    }

    /// Wire up the HTTP fetcher, extractor, cache and renderer from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);
        let extractor = Extractor::new(&config.extractor, &config.fetcher.source_url)?;
        let cache = ItemCache::new(fetcher, extractor, config)?;
        let renderer = FeedRenderer::new(config.feed.clone());

        Ok(Self::new(cache, renderer, config.cache.ttl_secs))
    }
}
