// src/analysis/disclaimer.rs
use crate::analysis::AnalysisKind;

/// Opening sentence of the disclaimer. Matched without the "Disclaimer:"
/// label so both plain and bold (`**Disclaimer:**`) renderings count.
pub fn marker(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Research => "This information is intended for research purposes only",
        AnalysisKind::CaseStudy => "This analysis is based on a review of past case law",
        AnalysisKind::Contract => "This analysis is based on an automated review",
        AnalysisKind::DocumentGeneration => "This document was generated by an AI assistant",
        AnalysisKind::News => "This news summary is for informational purposes only",
    }
}

fn body(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Research => "This information is intended for research purposes only and does not constitute legal advice. It is essential to consult with a qualified legal professional for advice tailored to your specific circumstances. The law is constantly evolving; always verify the information with primary legal sources. AI cannot replace the judgment, ethical considerations, and advocacy skills of a human lawyer. Do not submit client confidential information.",
        AnalysisKind::CaseStudy => "This analysis is based on a review of past case law and does not guarantee a specific outcome in the user's case. The outcome of any case depends on the specific facts, evidence, and arguments presented in court. This analysis should not be considered a substitute for legal advice from a qualified attorney. AI cannot assess the credibility of witnesses or the nuances of courtroom proceedings. Do not submit client confidential information.",
        AnalysisKind::Contract => "This analysis is based on an automated review and should not be considered a substitute for legal advice from a qualified attorney. The interpretation of contract clauses can be complex and may depend on the specific facts and circumstances. AI cannot assess the commercial context of the contract or the parties' intentions beyond the written document. This analysis does not address all possible legal issues. Do not submit client confidential information.",
        AnalysisKind::DocumentGeneration => "This document was generated by an AI assistant based on the information provided. It is intended as a draft for review and modification by a qualified legal professional. It does not constitute legal advice. Always ensure compliance with applicable laws and professional standards before finalizing or sending any legal document. Do not input highly sensitive or confidential client information without appropriate safeguards.",
        AnalysisKind::News => "This news summary is for informational purposes only and is based on publicly available news reports. It does not constitute legal advice. Always refer to the original sources and consult with a qualified legal professional for advice on specific legal matters. News reporting may evolve, and this summary reflects information available at the time of generation.",
    }
}

/// The block appended when the marker is missing.
pub fn block(kind: AnalysisKind) -> String {
    format!("\n\n---\n**Disclaimer:** {}", body(kind))
}

/// Append the canned block unless the marker is already there. Idempotent.
pub fn ensure(kind: AnalysisKind, mut text: String) -> String {
    if !text.contains(marker(kind)) {
        text.push_str(&block(kind));
    }
    text
}
