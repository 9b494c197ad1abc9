use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::analysis::{AnalysisKind, AnalysisOutcome, AnalysisRequest, LegalAssistant};
use crate::config::app::ServerConfig;
use crate::news::types::NewsItem;

#[derive(Clone)]
pub struct AppState {
    pub assistant: LegalAssistant,
}

pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/analyze", post(analyze))
        .route("/api/news", get(news_report))
        .route("/api/news/items", get(news_items))
        .with_state(state);

    if server.metrics_enabled {
        if let Some(handle) = crate::metrics::install_recorder() {
            router = router.merge(crate::metrics::router(handle));
        }
    }

    router
        .fallback_service(ServeDir::new(&server.static_dir))
        .layer(CorsLayer::very_permissive())
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub kind: AnalysisKind,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: &AnalysisOutcome) -> Self {
        let (analysis, message) = match outcome {
            AnalysisOutcome::Completed { text, .. } => (Some(text.clone()), None),
            other => (None, Some(other.message().to_string())),
        };
        Self {
            kind: outcome.kind(),
            status: outcome.status(),
            analysis,
            message,
        }
    }
}

impl IntoResponse for AnalysisOutcome {
    fn into_response(self) -> Response {
        let code = match &self {
            AnalysisOutcome::Completed { .. } | AnalysisOutcome::NothingFound { .. } => StatusCode::OK,
            AnalysisOutcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        };
        (code, Json(AnalysisResponse::from(&self))).into_response()
    }
}

async fn analyze(State(state): State<AppState>, Json(req): Json<AnalysisRequest>) -> AnalysisOutcome {
    state.assistant.handle(req).await
}

async fn news_report(State(state): State<AppState>) -> AnalysisOutcome {
    state.assistant.handle(AnalysisRequest::News).await
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

async fn news_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<NewsItem>>, (StatusCode, Json<ErrorBody>)> {
    let assistant = &state.assistant;
    assistant
        .aggregator()
        .aggregate(assistant.feeds())
        .await
        .map(Json)
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
        })
}
