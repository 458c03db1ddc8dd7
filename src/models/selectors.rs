// src/models/selectors.rs

//! CSS selectors for locating briefing entries on the source page.

use serde::{Deserialize, Serialize};

/// One set of structural selectors describing how entries are laid out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidatePattern {
    /// Pattern name for identification in logs
    pub name: String,

    /// Selector for each candidate block (one entry per match)
    pub block_selector: String,

    /// Selector for the heading element within a block
    pub title_selector: String,

    /// Selector for the anchor element within a block
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// Selector for the summary text within a block
    #[serde(default = "default_summary_selector")]
    pub summary_selector: String,

    /// Regex an anchor's `href` must match to be used as the item link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_pattern: Option<String>,
}

fn default_link_selector() -> String {
    "a[href]".to_string()
}

fn default_summary_selector() -> String {
    "p".to_string()
}

impl CandidatePattern {
    /// Create a pattern with the default link and summary selectors.
    pub fn new(
        name: impl Into<String>,
        block: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            block_selector: block.into(),
            title_selector: title.into(),
            link_selector: default_link_selector(),
            summary_selector: default_summary_selector(),
            link_pattern: None,
        }
    }

    pub fn with_link(mut self, selector: impl Into<String>) -> Self {
        self.link_selector = selector.into();
        self
    }

    pub fn with_link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.link_pattern = Some(pattern.into());
        self
    }

    /// Entries rendered as `div.briefing-item` blocks.
    pub fn briefing_item() -> Self {
        Self::new("briefing_item", "div.briefing-item", "h1, h2, h3, h4")
    }

    /// Series listing where each entry is an `<article>` linking to a dated briefing.
    pub fn briefing_article() -> Self {
        Self::new(
            "briefing_article",
            r#"article:has(a[href*="/briefing/"])"#,
            "h2, h3",
        )
        .with_link(r#"a[href*="/briefing/"]"#)
        .with_link_pattern(r"/\d{4}/\d{2}/\d{2}/briefing/")
    }
}
