// src/services/extractor.rs

//! Briefing entry extractor.
//!
//! Turns raw markup into an ordered list of [`ContentItem`]s using the
//! configured [`CandidatePattern`]s. All selector knowledge lives here.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, ExtractError, Result};
use crate::models::{CandidatePattern, ContentItem, ExtractorConfig};
use crate::utils::{normalize_whitespace, resolve_url, truncate_graphemes};

/// A [`CandidatePattern`] with its selectors parsed.
#[derive(Debug)]
struct CompiledPattern {
    name: String,
    block: Selector,
    title: Selector,
    link: Selector,
    summary: Selector,
    link_pattern: Option<Regex>,
}

impl CompiledPattern {
    fn compile(pattern: &CandidatePattern) -> Result<Self> {
        let link_pattern = pattern
            .link_pattern
            .as_deref()
            .map(|p| Regex::new(p).map_err(|e| AppError::selector(p, e)))
            .transpose()?;

        Ok(Self {
            name: pattern.name.clone(),
            block: parse_selector(&pattern.block_selector)?,
            title: parse_selector(&pattern.title_selector)?,
            link: parse_selector(&pattern.link_selector)?,
            summary: parse_selector(&pattern.summary_selector)?,
            link_pattern,
        })
    }

    fn accepts_href(&self, href: &str) -> bool {
        self.link_pattern.as_ref().is_none_or(|re| re.is_match(href))
    }
}

/// Extracts content items from the source page markup.
#[derive(Debug)]
pub struct Extractor {
    patterns: Vec<CompiledPattern>,
    base_url: Url,
    max_items: usize,
    max_summary_chars: usize,
    ellipsis: String,
}

impl Extractor {
    /// Compile the configured patterns; relative links resolve against `source_url`.
    pub fn new(config: &ExtractorConfig, source_url: &str) -> Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            base_url: Url::parse(source_url)?,
            max_items: config.max_items,
            max_summary_chars: config.max_summary_chars,
            ellipsis: config.ellipsis.clone(),
        })
    }

    /// Extract items, stamping each with the current time.
    pub fn extract(&self, raw_markup: &str) -> Result<Vec<ContentItem>> {
        self.extract_at(raw_markup, Utc::now())
    }

    /// Extract items, stamping each with `published_at`.
    ///
    /// The first pattern whose block selector matches anything is used for
    /// the whole page. Blocks without a title are skipped; the call only
    /// fails when no block yields an item.
    pub fn extract_at(
        &self,
        raw_markup: &str,
        published_at: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>> {
        let document = Html::parse_document(raw_markup);

        let Some((pattern, blocks)) = self.select_blocks(&document) else {
            log::warn!(
                "No candidate blocks matched any of {} patterns",
                self.patterns.len()
            );
            return Err(ExtractError::NoItemsFound { candidates: 0 }.into());
        };

        let candidates = blocks.len();
        let mut items = Vec::new();
        let mut skipped = 0usize;

        for block in blocks {
            if items.len() == self.max_items {
                break;
            }
            match self.parse_block(pattern, block, published_at) {
                Some(item) => items.push(item),
                None => skipped += 1,
            }
        }

        log::info!(
            "Pattern '{}': {} candidate blocks, {} items extracted, {} skipped",
            pattern.name,
            candidates,
            items.len(),
            skipped
        );

        if items.is_empty() {
            return Err(ExtractError::NoItemsFound { candidates }.into());
        }
        Ok(items)
    }

    fn select_blocks<'a>(
        &self,
        document: &'a Html,
    ) -> Option<(&CompiledPattern, Vec<ElementRef<'a>>)> {
        self.patterns.iter().find_map(|pattern| {
            let blocks: Vec<_> = document.select(&pattern.block).collect();
            if blocks.is_empty() {
                None
            } else {
                Some((pattern, blocks))
            }
        })
    }

    fn parse_block(
        &self,
        pattern: &CompiledPattern,
        block: ElementRef<'_>,
        published_at: DateTime<Utc>,
    ) -> Option<ContentItem> {
        let title = block
            .select(&pattern.title)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        if title.is_empty() {
            log::debug!("Skipping block without title ({})", pattern.name);
            return None;
        }

        // Missing or unusable anchors fall back to the source page itself.
        let link = block
            .select(&pattern.link)
            .filter_map(|el| el.value().attr("href"))
            .filter(|href| pattern.accepts_href(href))
            .find_map(|href| resolve_url(&self.base_url, href))
            .unwrap_or_else(|| self.base_url.to_string());

        let summary = block
            .select(&pattern.summary)
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
            .map(|text| truncate_graphemes(&text, self.max_summary_chars, &self.ellipsis))
            .unwrap_or_default();

        match ContentItem::new(title, link, summary, published_at) {
            Ok(item) => Some(item),
            Err(e) => {
                log::debug!("Skipping block ({}): {}", pattern.name, e);
                None
            }
        }
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
