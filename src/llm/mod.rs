//! Model collaborator: provider abstraction + instrumentation wrapper.
//!
//! The model is treated as an opaque request/response service. A flow builds
//! a [`PromptRequest`], an [`AiClient`] returns the single text field of the
//! model's JSON reply, or an [`LlmError`].

pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::ai::AiConfig;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// One model call: system instructions, user content, and the name of the
/// string field the reply JSON is expected to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub flow: &'static str,
    pub system: String,
    pub user: String,
    pub output_field: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("AI is disabled")]
    Disabled,
    #[error("missing API key for provider {0}")]
    MissingApiKey(&'static str),
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Short label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Disabled => "disabled",
            LlmError::MissingApiKey(_) => "missing_api_key",
            LlmError::Timeout(_) => "timeout",
            LlmError::Network(_) => "network",
            LlmError::RateLimited => "rate_limited",
            LlmError::Api { .. } => "api",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::EmptyResponse => "empty_response",
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(e.to_string())
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return LlmError::RateLimited;
        }
        let mut body = body;
        if body.len() > 300 {
            let cut = (0..=300).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
            body.truncate(cut);
        }
        LlmError::Api {
            status: status.as_u16(),
            body,
        }
    }
}

/// Client used by the flows and handlers.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Returns the text of `req.output_field` from the model's reply.
    async fn complete(&self, req: &PromptRequest) -> Result<String, LlmError>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynAiClient = Arc<dyn AiClient>;

/// Low-level provider: does the remote call and returns the raw reply text.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    async fn fetch(&self, req: &PromptRequest) -> Result<String, LlmError>;
    fn name(&self) -> &'static str;
}

/// Factory: build a client according to config and environment variables.
///
/// * `AI_TEST_MODE=mock` returns a deterministic mock client.
/// * `config.enabled == false` returns a disabled client.
/// * Otherwise the configured provider wrapped in [`InstrumentedClient`].
pub fn build_client_from_config(config: &AiConfig) -> DynAiClient {
    let timeout = Duration::from_secs(config.timeout_secs);

    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(InstrumentedClient::new(MockProvider::default(), timeout));
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    let built: anyhow::Result<DynAiClient> = match config.provider.as_str() {
        "openai" => OpenAiProvider::from_config(config)
            .map(|p| Arc::new(InstrumentedClient::new(p, timeout)) as DynAiClient),
        "gemini" => GeminiProvider::from_config(config)
            .map(|p| Arc::new(InstrumentedClient::new(p, timeout)) as DynAiClient),
        other => Err(anyhow::anyhow!("unsupported AI provider: {other}")),
    };

    match built {
        Ok(client) => client,
        Err(e) => {
            warn!(target: "llm", error = %e, "AI client unavailable, falling back to disabled");
            Arc::new(DisabledClient)
        }
    }
}

/// Always fails with [`LlmError::Disabled`]; used when AI is off.
pub struct DisabledClient;

#[async_trait]
impl AiClient for DisabledClient {
    async fn complete(&self, _req: &PromptRequest) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-reply provider for tests and local runs. With no fixed reply it
/// answers `{"<output_field>": "Mock <flow> response."}`.
#[derive(Clone, Default)]
pub struct MockProvider {
    pub fixed: Option<String>,
}

impl MockProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            fixed: Some(text.into()),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn fetch(&self, req: &PromptRequest) -> Result<String, LlmError> {
        Ok(match &self.fixed {
            Some(s) => s.clone(),
            None => serde_json::json!({ req.output_field: format!("Mock {} response.", req.flow) })
                .to_string(),
        })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ai_calls_total", "Model calls attempted.");
        describe_counter!("ai_errors_total", "Model calls that failed or returned nothing.");
        describe_histogram!("ai_call_ms", "Model call latency in milliseconds.");
    });
}

/// Wraps a provider with a hard timeout, output-field extraction, and
/// logs/metrics.
pub struct InstrumentedClient<P: Provider> {
    inner: P,
    timeout: Duration,
}

impl<P: Provider> InstrumentedClient<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<P: Provider> AiClient for InstrumentedClient<P> {
    async fn complete(&self, req: &PromptRequest) -> Result<String, LlmError> {
        ensure_metrics_described();
        counter!("ai_calls_total", "provider" => self.inner.name(), "flow" => req.flow).increment(1);

        let t0 = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.inner.fetch(req)).await {
            Ok(Ok(raw)) => extract_output_field(&raw, req.output_field),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        };
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ai_call_ms", "provider" => self.inner.name()).record(elapsed_ms);

        match &result {
            Ok(text) => debug!(
                target: "llm",
                provider = self.inner.name(),
                flow = req.flow,
                chars = text.chars().count(),
                elapsed_ms,
                "model call ok"
            ),
            Err(e) => {
                counter!("ai_errors_total", "provider" => self.inner.name(), "kind" => e.kind())
                    .increment(1);
                warn!(
                    target: "llm",
                    provider = self.inner.name(),
                    flow = req.flow,
                    error = %e,
                    elapsed_ms,
                    "model call failed"
                );
            }
        }
        result
    }

    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Pull `field` out of the model's reply.
///
/// Accepts a bare JSON object, one wrapped in a Markdown code fence, or plain
/// text (returned as-is). A JSON object without a string `field` is invalid;
/// blank output is [`LlmError::EmptyResponse`].
pub fn extract_output_field(raw: &str, field: &str) -> Result<String, LlmError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    if body.starts_with('{') {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
            let text = match map.get(field) {
                Some(serde_json::Value::String(s)) => s.trim().to_string(),
                Some(_) => {
                    return Err(LlmError::InvalidResponse(format!(
                        "field `{field}` is not a string"
                    )))
                }
                None => {
                    return Err(LlmError::InvalidResponse(format!("missing field `{field}`")))
                }
            };
            return if text.is_empty() {
                Err(LlmError::EmptyResponse)
            } else {
                Ok(text)
            };
        }
    }

    Ok(body.to_string())
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
