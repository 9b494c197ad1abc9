// tests/news_aggregate.rs
//
// Aggregation pipeline against a scripted feed source (no network).
//
// Covered:
// - one failing feed does not affect the others
// - no relevant items -> empty list
// - slow feed is cut off by the per-feed timeout
// - cap, snippet bound, undated-last ordering
// - same output regardless of fetch completion order
// - empty feed list rejected before any fetch
// - duplicate links across feeds collapse to one

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{entry, feed, news_config, ts, RecordingObserver, Scripted, ScriptedSource};
use legal_assistant::news::{AggregateError, NewsAggregator};

const A: &str = "https://a.test/rss";
const B: &str = "https://b.test/rss";

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn failed_feed_contributes_nothing_and_others_survive() {
    let source = ScriptedSource::new()
        .with(
            A,
            Scripted::Feed(feed(
                Some("Feed A"),
                vec![
                    entry("Court orders release", "https://a.test/1", None, Some(1_000)),
                    entry("Cricket scores", "https://a.test/2", None, Some(5_000)),
                    entry("Appeal court sets aside fine", "https://a.test/3", None, Some(3_000)),
                    entry("Traffic update", "https://a.test/4", Some("N1 closed"), Some(4_000)),
                    entry("Minister in court", "https://a.test/5", None, Some(2_000)),
                ],
            )),
        )
        .with(B, Scripted::Fail("dns error: no such host"));

    let observer = Arc::new(RecordingObserver::default());
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]))
        .with_observer(observer.clone());

    let (items, summary) = agg
        .aggregate_with_summary(&urls(&[A, B]))
        .await
        .expect("aggregate");

    let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(
        links,
        vec!["https://a.test/3", "https://a.test/5", "https://a.test/1"]
    );
    assert!(items.iter().all(|i| i.source_name == "Feed A"));

    assert_eq!(summary.feeds_ok, 1);
    assert_eq!(summary.feeds_failed, 1);
    assert_eq!(summary.filtered_out, 2);
    assert_eq!(summary.returned, 3);

    let failed = observer.failed.lock();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, B);
    assert!(failed[0].1.contains("dns error"));
    assert_eq!(observer.summaries.lock().len(), 1);
}

#[tokio::test]
async fn no_relevant_items_is_an_empty_list() {
    let source = ScriptedSource::new().with(
        A,
        Scripted::Feed(feed(
            None,
            vec![
                entry("Weather", "https://a.test/w", Some("Sunny"), Some(10)),
                entry("Sport", "https://a.test/s", None, None),
            ],
        )),
    );
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]));
    let items = agg.aggregate(&urls(&[A])).await.expect("aggregate");
    assert!(items.is_empty());
}

#[tokio::test]
async fn slow_feed_times_out_without_stalling_the_run() {
    let slow = feed(None, vec![entry("Court late", "https://b.test/late", None, Some(9))]);
    let source = ScriptedSource::new()
        .with(
            A,
            Scripted::Feed(feed(None, vec![entry("Court fast", "https://a.test/fast", None, Some(1))])),
        )
        .with(B, Scripted::Delayed(Duration::from_secs(5), slow));

    let observer = Arc::new(RecordingObserver::default());
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]))
        .with_observer(observer.clone())
        .with_feed_timeout(Duration::from_millis(150));

    let t0 = Instant::now();
    let items = agg.aggregate(&urls(&[A, B])).await.expect("aggregate");
    assert!(t0.elapsed() < Duration::from_secs(2), "timeout must bound the run");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].link, "https://a.test/fast");
    let failed = observer.failed.lock();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].1.contains("timed out"));
    assert!(failed[0].1.starts_with("scripted fetch"), "reason names the feed source");
}

#[tokio::test]
async fn output_is_capped_to_the_most_recent_items() {
    let entries = (0..25)
        .map(|i| entry(&format!("Court item {i}"), &format!("https://a.test/{i}"), None, Some(i * 60)))
        .collect();
    let source = ScriptedSource::new().with(A, Scripted::Feed(feed(None, entries)));
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]));

    let items = agg.aggregate(&urls(&[A])).await.expect("aggregate");
    assert_eq!(items.len(), 10);
    assert_eq!(items[0].title, "Court item 24");
    assert_eq!(items[9].title, "Court item 15");
}

#[tokio::test]
async fn snippets_respect_the_bound() {
    let long = format!("<p>{}</p>", "court proceedings continue ".repeat(50));
    let source = ScriptedSource::new().with(
        A,
        Scripted::Feed(feed(None, vec![entry("Update", "https://a.test/1", Some(&long), None)])),
    );
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]));
    let items = agg.aggregate(&urls(&[A])).await.expect("aggregate");

    assert_eq!(items.len(), 1, "keyword in snippet keeps the item");
    let snippet = items[0].summary_snippet.as_deref().expect("snippet");
    assert!(snippet.chars().count() <= 200);
    assert!(!snippet.contains("<p>"));
}

#[tokio::test]
async fn undated_items_come_after_all_dated_ones() {
    let source = ScriptedSource::new().with(
        A,
        Scripted::Feed(feed(
            None,
            vec![
                entry("Court undated", "https://a.test/u", None, None),
                entry("Court before epoch", "https://a.test/old", None, Some(-86_400)),
                entry("Court recent", "https://a.test/new", None, Some(1_760_000_000)),
            ],
        )),
    );
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]));
    let items = agg.aggregate(&urls(&[A])).await.expect("aggregate");

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Court recent", "Court before epoch", "Court undated"]);
    assert_eq!(items[1].published_at, Some(ts(-86_400)));
}

#[tokio::test]
async fn completion_order_does_not_change_the_result() {
    let fa = feed(Some("A"), vec![entry("Court A", "https://a.test/x", None, Some(500))]);
    let fb = feed(Some("B"), vec![entry("Court B", "https://b.test/x", None, Some(500))]);

    let run = |delay_a: u64, delay_b: u64| {
        let source = ScriptedSource::new()
            .with(A, Scripted::Delayed(Duration::from_millis(delay_a), fa.clone()))
            .with(B, Scripted::Delayed(Duration::from_millis(delay_b), fb.clone()));
        let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]));
        async move { agg.aggregate(&urls(&[A, B])).await.expect("aggregate") }
    };

    let first = run(80, 0).await;
    let second = run(0, 80).await;
    assert_eq!(first, second);
    assert_eq!(first[0].source_name, "A", "ties keep feed list order");
}

#[tokio::test]
async fn empty_feed_list_is_rejected_before_fetching() {
    let source = Arc::new(ScriptedSource::new());
    let agg = NewsAggregator::new(source.clone(), &news_config(&["court"]));

    assert_eq!(agg.aggregate(&[]).await, Err(AggregateError::NoFeeds));
    assert_eq!(
        agg.aggregate(&urls(&["  ", ""])).await,
        Err(AggregateError::NoFeeds)
    );
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn duplicate_links_keep_the_most_recent_copy() {
    let source = ScriptedSource::new()
        .with(
            A,
            Scripted::Feed(feed(Some("A"), vec![entry("Court ruling", "https://x.test/same", None, Some(100))])),
        )
        .with(
            B,
            Scripted::Feed(feed(Some("B"), vec![entry("Court ruling (updated)", "https://x.test/same", None, Some(200))])),
        );
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&["court"]));
    let (items, summary) = agg.aggregate_with_summary(&urls(&[A, B])).await.expect("aggregate");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source_name, "B");
    assert_eq!(summary.duplicates, 1);
}

#[tokio::test]
async fn empty_keyword_list_keeps_everything() {
    let source = ScriptedSource::new().with(
        A,
        Scripted::Feed(feed(
            None,
            vec![
                entry("Weather", "https://a.test/w", None, Some(2)),
                entry("Sport", "https://a.test/s", None, Some(1)),
            ],
        )),
    );
    let agg = NewsAggregator::new(Arc::new(source), &news_config(&[]));
    let items = agg.aggregate(&urls(&[A])).await.expect("aggregate");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].source_name, A, "feed URL stands in for a missing title");
}
