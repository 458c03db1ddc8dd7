//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::CandidatePattern;
use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source page and HTTP client settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Markup extraction rules
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Snapshot staleness policy
    #[serde(default)]
    pub cache: CacheConfig,

    /// Channel metadata for the rendered feed
    #[serde(default)]
    pub feed: FeedConfig,

    /// Listen address
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the named file, or fall back to defaults when none is given.
    ///
    /// A named file that cannot be read or parsed is an error.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).inspect_err(|e| {
                log::error!("Config load failed from {:?}: {}", path, e);
            }),
            None => {
                log::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.fetcher.source_url).is_err() {
            return Err(AppError::validation(format!(
                "fetcher.source_url is not an absolute URL: {}",
                self.fetcher.source_url
            )));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.extractor.max_items == 0 {
            return Err(AppError::validation("extractor.max_items must be > 0"));
        }
        if self.extractor.max_summary_chars == 0 {
            return Err(AppError::validation(
                "extractor.max_summary_chars must be > 0",
            ));
        }
        if self.extractor.patterns.is_empty() {
            return Err(AppError::validation("No extractor patterns defined"));
        }
        if self.feed.title.trim().is_empty() {
            return Err(AppError::validation("feed.title is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings for the source page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Page the feed is built from; also the base for relative links
    #[serde(default = "defaults::source_url")]
    pub source_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            source_url: defaults::source_url(),
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Extraction limits and selector patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum number of items kept from one page
    #[serde(default = "defaults::max_items")]
    pub max_items: usize,

    /// Maximum summary length in user-perceived characters
    #[serde(default = "defaults::max_summary_chars")]
    pub max_summary_chars: usize,

    /// Marker appended to truncated summaries
    #[serde(default = "defaults::ellipsis")]
    pub ellipsis: String,

    /// Selector patterns, tried in order
    #[serde(default = "defaults::patterns")]
    pub patterns: Vec<CandidatePattern>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_items: defaults::max_items(),
            max_summary_chars: defaults::max_summary_chars(),
            ellipsis: defaults::ellipsis(),
            patterns: defaults::patterns(),
        }
    }
}

/// Snapshot staleness policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds after `fetched_at` before a refresh is attempted
    #[serde(default = "defaults::ttl")]
    pub ttl_secs: u64,

    /// Minimum seconds between refresh attempts after a failed one
    #[serde(default = "defaults::retry")]
    pub retry_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn retry_after(&self) -> Duration {
        Duration::from_secs(self.retry_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::ttl(),
            retry_secs: defaults::retry(),
        }
    }
}

/// Fixed channel metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "defaults::feed_title")]
    pub title: String,

    #[serde(default = "defaults::feed_description")]
    pub description: String,

    #[serde(default = "defaults::language")]
    pub language: String,

    /// Name reported by the health endpoint
    #[serde(default = "defaults::service_name")]
    pub service_name: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: defaults::feed_title(),
            description: defaults::feed_description(),
            language: defaults::language(),
            service_name: defaults::service_name(),
        }
    }
}

/// Listen address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

mod defaults {
    use super::CandidatePattern;

    // Fetcher defaults
    pub fn source_url() -> String {
        "https://www.nytimes.com/series/us-morning-briefing".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.5".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Extractor defaults
    pub fn max_items() -> usize {
        20
    }
    pub fn max_summary_chars() -> usize {
        300
    }
    pub fn ellipsis() -> String {
        "…".into()
    }
    pub fn patterns() -> Vec<CandidatePattern> {
        vec![
            CandidatePattern::briefing_item(),
            CandidatePattern::briefing_article(),
        ]
    }

    // Cache defaults
    pub fn ttl() -> u64 {
        15 * 60
    }
    pub fn retry() -> u64 {
        60
    }

    // Feed defaults
    pub fn feed_title() -> String {
        "NYT US Morning Briefing (Unofficial RSS Feed)".into()
    }
    pub fn feed_description() -> String {
        "RSS feed for The New York Times US Morning Briefing series".into()
    }
    pub fn language() -> String {
        "en".into()
    }
    pub fn service_name() -> String {
        "briefing-rss".into()
    }

    // Server defaults
    pub fn host() -> String {
        "0.0.0.0".into()
    }
    pub fn port() -> u16 {
        8080
    }
}
