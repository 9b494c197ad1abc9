// src/news/observer.rs
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

/// Per-run counts reported once all feeds have settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AggregateSummary {
    pub feeds_ok: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub dropped_incomplete: usize,
    pub filtered_out: usize,
    pub duplicates: usize,
    pub returned: usize,
    pub elapsed_ms: u64,
}

/// Where the aggregator reports what happened. Keeps logging and metrics
/// out of the pipeline itself so tests can count failures directly.
pub trait AggregationObserver: Send + Sync {
    fn feed_fetched(&self, url: &str, entries: usize);
    fn feed_failed(&self, url: &str, reason: &str);
    fn run_completed(&self, summary: &AggregateSummary);
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_feed_fetch_total", "Feeds fetched and parsed.");
        describe_counter!(
            "news_feed_errors_total",
            "Feed fetch/parse failures and timeouts."
        );
        describe_counter!(
            "news_items_returned_total",
            "Items returned by aggregation runs."
        );
        describe_histogram!("news_aggregate_ms", "Aggregation run time in milliseconds.");
    });
}

/// Default observer: structured `tracing` events + Prometheus series.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl AggregationObserver for MetricsObserver {
    fn feed_fetched(&self, url: &str, entries: usize) {
        ensure_metrics_described();
        counter!("news_feed_fetch_total").increment(1);
        tracing::debug!(target: "news", feed = %url, entries, "feed fetched");
    }

    fn feed_failed(&self, url: &str, reason: &str) {
        ensure_metrics_described();
        counter!("news_feed_errors_total").increment(1);
        tracing::warn!(target: "news", feed = %url, error = %reason, "feed skipped");
    }

    fn run_completed(&self, s: &AggregateSummary) {
        ensure_metrics_described();
        counter!("news_items_returned_total").increment(s.returned as u64);
        histogram!("news_aggregate_ms").record(s.elapsed_ms as f64);
        tracing::info!(
            target: "news",
            feeds_ok = s.feeds_ok,
            feeds_failed = s.feeds_failed,
            seen = s.entries_seen,
            incomplete = s.dropped_incomplete,
            filtered = s.filtered_out,
            duplicates = s.duplicates,
            returned = s.returned,
            elapsed_ms = s.elapsed_ms,
            "aggregation run"
        );
    }
}
