use crate::config::RunConfig;
use crate::models::FeedItem;
use chrono::{DateTime, TimeZone, Utc};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Serialize feed items as an RSS 2.0 document
pub fn feed_xml<Tz: TimeZone>(items: &[FeedItem], config: &RunConfig, built: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let items: Vec<rss::Item> = items.iter().map(to_rss_item).collect();

    let channel = ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.page_url())
        .description(config.description.clone())
        .last_build_date(Some(built.to_rfc2822()))
        .generator(Some(GENERATOR.to_string()))
        .items(items)
        .build();

    channel.to_string()
}

fn to_rss_item(item: &FeedItem) -> rss::Item {
    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .author(non_empty(&item.author))
        .link(non_empty(&item.link))
        .description(non_empty(&item.description))
        .pub_date(item.pub_date.map(|t| Utc.from_utc_datetime(&t).to_rfc2822()))
        .guid(
            GuidBuilder::default()
                .permalink(false)
                .value(item.guid.clone())
                .build(),
        )
        .build()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
