//! Feed item and snapshot structures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::error::{AppError, Result};

/// A single entry extracted from the source page.
///
/// Fields are private so an item can only be built through [`ContentItem::new`],
/// which guarantees a non-empty title and an absolute link.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContentItem {
    title: String,
    link: String,
    summary: String,
    published_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create an item, rejecting empty titles and non-absolute links.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::validation("item title is empty"));
        }

        let link = link.into();
        let parsed = Url::parse(&link)?;
        if parsed.cannot_be_a_base() {
            return Err(AppError::validation(format!("item link is not absolute: {link}")));
        }

        Ok(Self {
            title,
            link,
            summary: summary.into(),
            published_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}

/// The result of one successful extraction, in source page order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub items: Vec<ContentItem>,
    pub fetched_at: DateTime<Utc>,
    pub source_url: String,
}

impl FeedSnapshot {
    pub fn new(items: Vec<ContentItem>, fetched_at: DateTime<Utc>, source_url: impl Into<String>) -> Self {
        Self {
            items,
            fetched_at,
            source_url: source_url.into(),
        }
    }

    /// Age of the snapshot relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }
}
