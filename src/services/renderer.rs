// src/services/renderer.rs

//! RSS 2.0 rendering of a [`FeedSnapshot`].

use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::error::{AppError, Result};
use crate::models::{ContentItem, FeedConfig, FeedSnapshot};
use crate::utils::strip_non_xml_chars;

const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Text fields may be emitted as CDATA sections, which cannot contain this.
const CDATA_END: &str = "]]>";

/// Renders snapshots as RSS XML with fixed channel metadata.
#[derive(Debug, Clone)]
pub struct FeedRenderer {
    feed: FeedConfig,
}

impl FeedRenderer {
    pub fn new(feed: FeedConfig) -> Self {
        Self { feed }
    }

    /// Render `snapshot` as an RSS 2.0 document.
    ///
    /// Pure: the output depends only on the snapshot and the channel metadata.
    pub fn render(&self, snapshot: &FeedSnapshot) -> Result<String> {
        let channel = self.build_channel(snapshot);
        let bytes = channel.write_to(Vec::new()).map_err(AppError::render)?;
        String::from_utf8(bytes).map_err(AppError::render)
    }

    fn build_channel(&self, snapshot: &FeedSnapshot) -> Channel {
        ChannelBuilder::default()
            .title(xml_text(&self.feed.title))
            .link(snapshot.source_url.clone())
            .description(xml_text(&self.feed.description))
            .language(Some(self.feed.language.clone()))
            .last_build_date(Some(snapshot.fetched_at.to_rfc2822()))
            .generator(Some(GENERATOR.to_string()))
            .items(snapshot.items.iter().map(build_item).collect::<Vec<_>>())
            .build()
    }
}

fn xml_text(text: &str) -> String {
    strip_non_xml_chars(text).replace(CDATA_END, "]] >")
}

fn build_item(item: &ContentItem) -> Item {
    let guid = GuidBuilder::default()
        .value(item.link().to_string())
        .permalink(true)
        .build();

    ItemBuilder::default()
        .title(Some(xml_text(item.title())))
        .link(Some(item.link().to_string()))
        .description(Some(xml_text(item.summary())))
        .guid(Some(guid))
        .pub_date(Some(item.published_at().to_rfc2822()))
        .build()
}
