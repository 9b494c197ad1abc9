// src/analysis/guard.rs
//! Input preconditions checked before any model call. Each check returns the
//! text to send on success or the user-facing rejection message.

pub const RESEARCH_MIN_CHARS: usize = 10;
pub const CASE_STUDY_MIN_CHARS: usize = 20;
pub const CONTRACT_MIN_CHARS: usize = 50;
pub const DOCUMENT_GENERATION_MIN_CHARS: usize = 30;

pub const CASE_STUDY_KEYWORDS: &[&str] = &[
    "case",
    "dispute",
    "claim",
    "prosecution",
    "facts",
    "client",
    "court",
    "sue",
    "defend",
];

pub const CONTRACT_KEYWORDS: &[&str] = &[
    "contract",
    "agreement",
    "clause",
    "party",
    "parties",
    "term",
    "condition",
    "lease",
    "sale",
    "employment",
];

pub const RESEARCH_TOO_SHORT: &str = "Please provide a more detailed legal research question.";
pub const CASE_STUDY_TOO_SHORT: &str =
    "Please provide more detailed information about the case study for analysis.";
pub const CASE_STUDY_OFF_TOPIC: &str =
    "Please ensure your input describes a legal case study, including key facts and context.";
pub const CONTRACT_TOO_SHORT: &str = "Please provide the full contract text or a more detailed description including the contract type, client context, and specific areas of concern.";
pub const CONTRACT_OFF_TOPIC: &str =
    "Please ensure your input relates to a contract analysis, including the document text or key details.";
pub const DOCUMENT_GENERATION_TOO_SHORT: &str =
    "Please provide more details, including the type of document needed and the context.";

pub type GuardResult = Result<String, &'static str>;

fn long_enough(text: &str, min_chars: usize) -> Option<&str> {
    let t = text.trim();
    (t.chars().count() >= min_chars).then_some(t)
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn research(query: &str) -> GuardResult {
    long_enough(query, RESEARCH_MIN_CHARS)
        .map(str::to_string)
        .ok_or(RESEARCH_TOO_SHORT)
}

pub fn case_study(details: &str) -> GuardResult {
    let t = long_enough(details, CASE_STUDY_MIN_CHARS).ok_or(CASE_STUDY_TOO_SHORT)?;
    if !mentions_any(t, CASE_STUDY_KEYWORDS) {
        return Err(CASE_STUDY_OFF_TOPIC);
    }
    Ok(t.to_string())
}

pub fn contract(document: &str) -> GuardResult {
    let t = long_enough(document, CONTRACT_MIN_CHARS).ok_or(CONTRACT_TOO_SHORT)?;
    if !mentions_any(t, CONTRACT_KEYWORDS) {
        return Err(CONTRACT_OFF_TOPIC);
    }
    Ok(t.to_string())
}

/// Both the document type and the context must be present; the combined
/// prompt input must reach the minimum length.
pub fn document_generation(doc_type: &str, context: &str, historical: Option<&str>) -> GuardResult {
    let (doc_type, context) = (doc_type.trim(), context.trim());
    if doc_type.is_empty() || context.is_empty() {
        return Err(DOCUMENT_GENERATION_TOO_SHORT);
    }
    let mut combined = format!("Document Type: {doc_type}\nContext: {context}");
    if let Some(h) = historical.map(str::trim).filter(|h| !h.is_empty()) {
        combined.push_str("\nHistorical Reference: ");
        combined.push_str(h);
    }
    long_enough(&combined, DOCUMENT_GENERATION_MIN_CHARS)
        .map(str::to_string)
        .ok_or(DOCUMENT_GENERATION_TOO_SHORT)
}
