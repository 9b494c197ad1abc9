// src/news/mod.rs
//! Legal news aggregation: concurrent feed fetch, normalization, keyword
//! relevance filter, recency ordering and a bounded result.

pub mod http;
pub mod observer;
pub mod rss;
pub mod text;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::debug;

use crate::config::app::NewsConfig;
use crate::news::observer::{AggregateSummary, AggregationObserver, MetricsObserver};

pub use crate::news::http::HttpFeedSource;
pub use crate::news::types::{FeedSource, NewsItem, RawEntry, RawFeed};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no feed URLs configured")]
    NoFeeds,
}

/// Feed title when present and non-blank, otherwise the feed URL.
pub fn source_name_for(feed_title: Option<&str>, feed_url: &str) -> String {
    text::non_blank(feed_title).unwrap_or_else(|| feed_url.to_string())
}

/// Build `NewsItem`s from one parsed feed. Entries missing a title or a
/// link are dropped; the second value counts them.
pub fn normalize_feed(feed_url: &str, feed: RawFeed, snippet_max_chars: usize) -> (Vec<NewsItem>, usize) {
    let source_name = source_name_for(feed.title.as_deref(), feed_url);
    let mut dropped = 0usize;
    let mut out = Vec::with_capacity(feed.entries.len());

    for entry in feed.entries {
        let title = text::non_blank(entry.title.as_deref());
        let link = entry
            .link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let (Some(title), Some(link)) = (title, link) else {
            dropped += 1;
            continue;
        };

        out.push(NewsItem {
            title,
            link,
            summary_snippet: text::snippet(entry.description.as_deref(), snippet_max_chars),
            published_at: entry.published.as_deref().and_then(rss::parse_published),
            source_name: source_name.clone(),
        });
    }

    (out, dropped)
}

/// Case-insensitive substring match on title or snippet. `keywords` must
/// already be lower-case; an empty list keeps everything.
pub fn is_relevant(item: &NewsItem, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let title = item.title.to_lowercase();
    let snippet = item
        .summary_snippet
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    keywords
        .iter()
        .any(|k| title.contains(k.as_str()) || snippet.contains(k.as_str()))
}

/// Newest first; undated items sink below every dated one (pre-1970 dates
/// included). Stable, so equal dates keep their feed order.
pub fn sort_by_recency(items: &mut [NewsItem]) {
    items.sort_by_key(|it| {
        std::cmp::Reverse((it.published_at.is_some(), it.published_at))
    });
}

pub struct NewsAggregator {
    source: Arc<dyn FeedSource>,
    observer: Arc<dyn AggregationObserver>,
    keywords: Vec<String>,
    snippet_max_chars: usize,
    max_items: usize,
    feed_timeout: Duration,
}

impl NewsAggregator {
    pub fn new(source: Arc<dyn FeedSource>, cfg: &NewsConfig) -> Self {
        Self {
            source,
            observer: Arc::new(MetricsObserver),
            keywords: cfg.keywords.iter().map(|k| k.to_lowercase()).collect(),
            snippet_max_chars: cfg.snippet_max_chars,
            max_items: cfg.max_items,
            feed_timeout: Duration::from_secs(cfg.feed_timeout_secs),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AggregationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the per-feed deadline (tests use sub-second values).
    pub fn with_feed_timeout(mut self, timeout: Duration) -> Self {
        self.feed_timeout = timeout;
        self
    }

    pub async fn aggregate(&self, feed_urls: &[String]) -> Result<Vec<NewsItem>, AggregateError> {
        self.aggregate_with_summary(feed_urls).await.map(|(items, _)| items)
    }

    pub async fn aggregate_with_summary(
        &self,
        feed_urls: &[String],
    ) -> Result<(Vec<NewsItem>, AggregateSummary), AggregateError> {
        let urls: Vec<&str> = feed_urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(AggregateError::NoFeeds);
        }

        let t0 = Instant::now();
        let mut summary = AggregateSummary::default();

        // Fan out; join_all yields results in input order regardless of
        // completion order.
        let settled = join_all(urls.iter().map(|url| self.fetch_one(url))).await;

        let mut items = Vec::new();
        for (url, result) in urls.iter().zip(settled) {
            match result {
                Ok(feed) => {
                    summary.feeds_ok += 1;
                    summary.entries_seen += feed.entries.len();
                    self.observer.feed_fetched(url, feed.entries.len());
                    let (mut normalized, dropped) = normalize_feed(url, feed, self.snippet_max_chars);
                    summary.dropped_incomplete += dropped;
                    items.append(&mut normalized);
                }
                Err(reason) => {
                    summary.feeds_failed += 1;
                    self.observer.feed_failed(url, &reason);
                }
            }
        }

        let before = items.len();
        items.retain(|it| is_relevant(it, &self.keywords));
        summary.filtered_out = before - items.len();

        sort_by_recency(&mut items);

        let mut seen_links: HashSet<String> = HashSet::new();
        let before = items.len();
        items.retain(|it| seen_links.insert(it.link.clone()));
        summary.duplicates = before - items.len();

        items.truncate(self.max_items);

        summary.returned = items.len();
        summary.elapsed_ms = t0.elapsed().as_millis() as u64;
        self.observer.run_completed(&summary);

        Ok((items, summary))
    }

    async fn fetch_one(&self, url: &str) -> Result<RawFeed, String> {
        debug!(target: "news", source = self.source.name(), feed = url, "fetching feed");
        match tokio::time::timeout(self.feed_timeout, self.source.fetch(url)).await {
            Ok(Ok(feed)) => Ok(feed),
            Ok(Err(e)) => Err(format!("{e:#}")),
            Err(_) => Err(format!("{} fetch timed out after {:?}", self.source.name(), self.feed_timeout)),
        }
    }
}
