// src/news/http.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;

use crate::news::rss::parse_feed;
use crate::news::types::{FeedSource, RawFeed};

/// Downloads feeds over HTTP and parses them as RSS/Atom.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<RawFeed> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("feed http get {url}"))?
            .error_for_status()
            .with_context(|| format!("feed non-2xx {url}"))?
            .text()
            .await
            .with_context(|| format!("feed http .text() {url}"))?;

        let t0 = std::time::Instant::now();
        let feed = parse_feed(&body).with_context(|| format!("feed parse {url}"))?;
        histogram!("news_feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(feed)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
