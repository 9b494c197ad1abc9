// src/analysis/mod.rs
//! Request router: one closed enum of analysis kinds, each dispatched to its
//! guard, prompt, model call and disclaimer check.

pub mod disclaimer;
pub mod guard;
pub mod news;
pub mod prompts;

use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm::DynAiClient;
use crate::news::NewsAggregator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Research,
    CaseStudy,
    Contract,
    DocumentGeneration,
    News,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Research => "research",
            AnalysisKind::CaseStudy => "case_study",
            AnalysisKind::Contract => "contract",
            AnalysisKind::DocumentGeneration => "document_generation",
            AnalysisKind::News => "news",
        }
    }

    /// Name of the single text field the model is asked to return.
    pub fn output_field(self) -> &'static str {
        match self {
            AnalysisKind::Research | AnalysisKind::CaseStudy => "analysis",
            AnalysisKind::Contract => "analysisReport",
            AnalysisKind::DocumentGeneration => "generatedDocument",
            AnalysisKind::News => "newsReport",
        }
    }

    /// Generic message shown when the model call fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            AnalysisKind::Research => "An error occurred while processing your request. Please try again or refine your query. Ensure you are asking a legal research question.",
            AnalysisKind::CaseStudy => "An error occurred while analyzing the case study. Please try again or refine your description. Ensure you provide sufficient details about the case.",
            AnalysisKind::Contract => "An error occurred while analyzing the document. Please try again or refine your input. Ensure you provide enough detail about the contract and your analysis needs.",
            AnalysisKind::DocumentGeneration => "An error occurred while generating the document. Please try again or refine your request.",
            AnalysisKind::News => "An error occurred while fetching legal news. Please try again later.",
        }
    }
}

/// Incoming request, tagged by `"type"`. Missing text fields deserialize as
/// empty and are then rejected by the guards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisRequest {
    Research {
        #[serde(default)]
        query: String,
    },
    CaseStudy {
        #[serde(default)]
        details: String,
    },
    Contract {
        #[serde(default)]
        document: String,
    },
    DocumentGeneration {
        #[serde(default)]
        doc_type: String,
        #[serde(default)]
        context: String,
        #[serde(default)]
        historical_docs: Option<String>,
    },
    News,
}

impl AnalysisRequest {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisRequest::Research { .. } => AnalysisKind::Research,
            AnalysisRequest::CaseStudy { .. } => AnalysisKind::CaseStudy,
            AnalysisRequest::Contract { .. } => AnalysisKind::Contract,
            AnalysisRequest::DocumentGeneration { .. } => AnalysisKind::DocumentGeneration,
            AnalysisRequest::News => AnalysisKind::News,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed { kind: AnalysisKind, text: String },
    Rejected { kind: AnalysisKind, message: &'static str },
    NothingFound { message: &'static str },
    Failed { kind: AnalysisKind, message: &'static str },
}

impl AnalysisOutcome {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutcome::Completed { kind, .. }
            | AnalysisOutcome::Rejected { kind, .. }
            | AnalysisOutcome::Failed { kind, .. } => *kind,
            AnalysisOutcome::NothingFound { .. } => AnalysisKind::News,
        }
    }

    /// The single user-facing string for this outcome.
    pub fn message(&self) -> &str {
        match self {
            AnalysisOutcome::Completed { text, .. } => text,
            AnalysisOutcome::Rejected { message, .. }
            | AnalysisOutcome::NothingFound { message }
            | AnalysisOutcome::Failed { message, .. } => message,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            AnalysisOutcome::Completed { .. } => "completed",
            AnalysisOutcome::Rejected { .. } => "rejected",
            AnalysisOutcome::NothingFound { .. } => "nothing_found",
            AnalysisOutcome::Failed { .. } => "failed",
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("analysis_requests_total", "Analysis requests received, by kind.");
        describe_counter!(
            "analysis_rejected_total",
            "Requests rejected by input preconditions."
        );
        describe_counter!(
            "analysis_failed_total",
            "Requests that ended in a generic failure message."
        );
    });
}

/// Short, non-reversible id for user input in logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Dispatches analysis requests. Collaborators are injected at construction.
#[derive(Clone)]
pub struct LegalAssistant {
    ai: DynAiClient,
    aggregator: Arc<NewsAggregator>,
    feeds: Arc<Vec<String>>,
}

impl LegalAssistant {
    pub fn new(ai: DynAiClient, aggregator: Arc<NewsAggregator>, feeds: Vec<String>) -> Self {
        Self {
            ai,
            aggregator,
            feeds: Arc::new(feeds),
        }
    }

    pub fn aggregator(&self) -> &NewsAggregator {
        &self.aggregator
    }

    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    pub fn ai_provider(&self) -> &'static str {
        self.ai.provider_name()
    }

    /// Never fails: every error path becomes an outcome with a message.
    pub async fn handle(&self, req: AnalysisRequest) -> AnalysisOutcome {
        ensure_metrics_described();
        let kind = req.kind();
        counter!("analysis_requests_total", "kind" => kind.as_str()).increment(1);

        let prepared = match &req {
            AnalysisRequest::Research { query } => guard::research(query),
            AnalysisRequest::CaseStudy { details } => guard::case_study(details),
            AnalysisRequest::Contract { document } => guard::contract(document),
            AnalysisRequest::DocumentGeneration {
                doc_type,
                context,
                historical_docs,
            } => guard::document_generation(doc_type, context, historical_docs.as_deref()),
            AnalysisRequest::News => return news::report(self).await,
        };

        match prepared {
            Ok(input) => self.complete(kind, &input).await,
            Err(message) => {
                counter!("analysis_rejected_total", "kind" => kind.as_str()).increment(1);
                info!(target: "analysis", kind = kind.as_str(), reason = message, "request rejected");
                AnalysisOutcome::Rejected { kind, message }
            }
        }
    }

    /// Prompt, call, post-process. `input` has passed its guard.
    pub(crate) async fn complete(&self, kind: AnalysisKind, input: &str) -> AnalysisOutcome {
        let id = anon_hash(input);
        let len = input.chars().count();
        info!(target: "analysis", kind = kind.as_str(), %id, len, provider = self.ai.provider_name(), "calling model");

        let prompt = prompts::build(kind, input);
        match self.ai.complete(&prompt).await {
            Ok(text) => AnalysisOutcome::Completed {
                kind,
                text: disclaimer::ensure(kind, text),
            },
            Err(e) => {
                counter!("analysis_failed_total", "kind" => kind.as_str()).increment(1);
                warn!(target: "analysis", kind = kind.as_str(), %id, error = %e, "model call failed");
                AnalysisOutcome::Failed {
                    kind,
                    message: kind.failure_message(),
                }
            }
        }
    }
}
