// tests/common/mod.rs
//
// Test doubles shared by the integration tests: a scripted feed source, a
// recording aggregation observer, a scripted model client, and a helper to
// spawn a local axum server.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use legal_assistant::config::app::NewsConfig;
use legal_assistant::llm::{AiClient, LlmError, PromptRequest};
use legal_assistant::news::observer::{AggregateSummary, AggregationObserver};
use legal_assistant::news::{FeedSource, RawEntry, RawFeed};

pub const BODY_LIMIT: usize = 1024 * 1024;

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

pub fn rfc2822(secs: i64) -> String {
    ts(secs).to_rfc2822()
}

pub fn entry(title: &str, link: &str, description: Option<&str>, published: Option<i64>) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        description: description.map(str::to_string),
        published: published.map(rfc2822),
    }
}

pub fn feed(title: Option<&str>, entries: Vec<RawEntry>) -> RawFeed {
    RawFeed {
        title: title.map(str::to_string),
        entries,
    }
}

/// Aggregator config with a single keyword and the usual bounds.
pub fn news_config(keywords: &[&str]) -> NewsConfig {
    NewsConfig {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        ..NewsConfig::default()
    }
}

#[derive(Clone)]
pub enum Scripted {
    Feed(RawFeed),
    Fail(&'static str),
    Delayed(Duration, RawFeed),
}

/// Feed source answering from a URL -> behaviour table.
#[derive(Default)]
pub struct ScriptedSource {
    pub table: HashMap<String, Scripted>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, behaviour: Scripted) -> Self {
        self.table.insert(url.to_string(), behaviour);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> anyhow::Result<RawFeed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.table.get(url).cloned() {
            Some(Scripted::Feed(f)) => Ok(f),
            Some(Scripted::Fail(msg)) => Err(anyhow::anyhow!(msg)),
            Some(Scripted::Delayed(d, f)) => {
                tokio::time::sleep(d).await;
                Ok(f)
            }
            None => Err(anyhow::anyhow!("connection refused")),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Observer that keeps everything it is told.
#[derive(Default)]
pub struct RecordingObserver {
    pub fetched: Mutex<Vec<(String, usize)>>,
    pub failed: Mutex<Vec<(String, String)>>,
    pub summaries: Mutex<Vec<AggregateSummary>>,
}

impl AggregationObserver for RecordingObserver {
    fn feed_fetched(&self, url: &str, entries: usize) {
        self.fetched.lock().push((url.to_string(), entries));
    }
    fn feed_failed(&self, url: &str, reason: &str) {
        self.failed.lock().push((url.to_string(), reason.to_string()));
    }
    fn run_completed(&self, summary: &AggregateSummary) {
        self.summaries.lock().push(summary.clone());
    }
}

/// Model client that records prompts and replays a fixed answer.
pub struct ScriptedClient {
    pub reply: Result<String, &'static str>,
    pub prompts: Mutex<Vec<PromptRequest>>,
}

impl ScriptedClient {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("upstream 500"),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn complete(&self, req: &PromptRequest) -> Result<String, LlmError> {
        self.prompts.lock().push(req.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(body) => Err(LlmError::Api {
                status: 500,
                body: body.to_string(),
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Serve `router` on an ephemeral local port; returns the base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}
