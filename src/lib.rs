// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analysis;
pub mod api;
pub mod config;
pub mod llm;
pub mod metrics;
pub mod news;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

pub use crate::analysis::{AnalysisOutcome, AnalysisRequest, LegalAssistant};
pub use crate::api::{create_router, AppState};
pub use crate::news::{NewsAggregator, NewsItem};

use crate::config::{AiConfig, AppConfig};
use crate::news::HttpFeedSource;

/// Wire the collaborators from configuration: HTTP feed source, model client,
/// aggregator and router state.
pub fn build_state(app: &AppConfig, ai: &AiConfig) -> anyhow::Result<AppState> {
    let source = HttpFeedSource::new(
        &app.news.user_agent,
        Duration::from_secs(app.news.feed_timeout_secs),
    )?;
    let aggregator = NewsAggregator::new(Arc::new(source), &app.news);
    let client = llm::build_client_from_config(ai);
    let assistant = LegalAssistant::new(client, Arc::new(aggregator), app.news.feeds.clone());

    info!(
        feeds = app.news.feeds.len(),
        keywords = app.news.keywords.len(),
        max_items = app.news.max_items,
        ai_provider = assistant.ai_provider(),
        ai_enabled = ai.enabled,
        "legal assistant configured"
    );

    Ok(AppState { assistant })
}

/// Load configuration from the default locations and build the full router.
pub async fn app() -> anyhow::Result<Router> {
    let app_cfg = AppConfig::load_default()?;
    let ai_cfg = AiConfig::load_default()?;
    let state = build_state(&app_cfg, &ai_cfg)?;
    Ok(create_router(state, &app_cfg.server))
}
