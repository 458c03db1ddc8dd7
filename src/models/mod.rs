// src/models/mod.rs

//! Domain models for the feed service.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod health;
mod item;
mod selectors;

// Re-export all public types
pub use config::{CacheConfig, Config, ExtractorConfig, FeedConfig, FetcherConfig, ServerConfig};
pub use health::{HealthReport, HealthStatus};
pub use item::{ContentItem, FeedSnapshot};
pub use selectors::CandidatePattern;
