//! Service layer for the feed pipeline.
//!
//! This module contains the business logic for:
//! - Source page retrieval (`HttpFetcher`)
//! - Briefing entry extraction (`Extractor`)
//! - RSS rendering (`FeedRenderer`)

mod extractor;
mod fetcher;
mod renderer;
#[cfg(test)]
pub(crate) mod testing;

pub use extractor::Extractor;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use renderer::FeedRenderer;
