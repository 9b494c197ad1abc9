// src/analysis/news.rs
use metrics::counter;
use tracing::{info, warn};

use crate::analysis::{AnalysisKind, AnalysisOutcome, LegalAssistant};
use crate::news::AggregateError;

pub const NO_NEWS_MESSAGE: &str =
    "No relevant recent legal news found. Please check back later.";

/// Aggregate the configured feeds and have the model summarise them. No
/// model call is made when nothing relevant was found.
pub async fn report(assistant: &LegalAssistant) -> AnalysisOutcome {
    let kind = AnalysisKind::News;

    let items = match assistant.aggregator().aggregate(assistant.feeds()).await {
        Ok(items) => items,
        Err(AggregateError::NoFeeds) => {
            counter!("analysis_failed_total", "kind" => kind.as_str()).increment(1);
            warn!(target: "analysis", kind = kind.as_str(), "no news feeds configured");
            return AnalysisOutcome::Failed {
                kind,
                message: kind.failure_message(),
            };
        }
    };

    if items.is_empty() {
        info!(target: "analysis", kind = kind.as_str(), "no relevant news items");
        return AnalysisOutcome::NothingFound {
            message: NO_NEWS_MESSAGE,
        };
    }

    let payload = match serde_json::to_string_pretty(&items) {
        Ok(p) => p,
        Err(e) => {
            counter!("analysis_failed_total", "kind" => kind.as_str()).increment(1);
            warn!(target: "analysis", kind = kind.as_str(), error = %e, "serializing news items");
            return AnalysisOutcome::Failed {
                kind,
                message: kind.failure_message(),
            };
        }
    };

    assistant.complete(kind, &payload).await
}
