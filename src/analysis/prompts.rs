// src/analysis/prompts.rs
use crate::analysis::{disclaimer, AnalysisKind};
use crate::llm::PromptRequest;

const FORMATTING: &str = "Format the answer in Markdown: use ## for main sections and ### for subsections, \
bullet points (- ) or numbered lists (1. ) for enumerations, and short paragraphs. \
Never present the answer as legal advice and never represent yourself as a lawyer.";

fn role(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Research => "You are a legal research assistant with expert knowledge of South African law. \
Identify the legal issues in the query, summarise the relevant legislation, case law and principles, \
distinguish binding from persuasive authority, and cite sources with links where available. \
If you cannot find reliable information, say so and suggest alternative search terms.",
        AnalysisKind::CaseStudy => "You are a legal analyst reviewing a case study under South African law. \
Summarise the key facts, identify the legal issues, discuss comparable past cases and how courts decided them, \
and outline the strengths and weaknesses of each side's position.",
        AnalysisKind::Contract => "You are a contract review assistant applying South African law. \
Identify the contract type and parties, summarise the key terms, flag unusual, ambiguous or one-sided clauses, \
note missing standard protections, and list questions the reviewing attorney should raise.",
        AnalysisKind::DocumentGeneration => "You are a legal drafting assistant. Draft the requested document \
in a professional format suitable for South African practice, using the context provided and following the \
structure of any historical reference documents. Mark placeholders for missing details in [square brackets].",
        AnalysisKind::News => "You are a legal news reporter for South African legal professionals. \
Using only the news items provided, write a report headed `## Recent South African Legal News`. \
For each item use a ### subheading with the headline, a 2-4 sentence objective summary, and a line \
`**Source:** [Publication Name](URL)`. Do not invent items that are not in the list.",
    }
}

fn user_heading(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Research => "Research query",
        AnalysisKind::CaseStudy => "Case details",
        AnalysisKind::Contract => "Contract text and instructions",
        AnalysisKind::DocumentGeneration => "Document request",
        AnalysisKind::News => "News items (JSON)",
    }
}

/// Assemble the model request for one flow. `input` is already validated.
pub fn build(kind: AnalysisKind, input: &str) -> PromptRequest {
    let system = format!(
        "{}\n\n{}\n\nEnd every response with a disclaimer separated by --- that begins: \"{}\".",
        role(kind),
        FORMATTING,
        disclaimer::marker(kind)
    );
    PromptRequest {
        flow: kind.as_str(),
        system,
        user: format!("{}:\n{}", user_heading(kind), input),
        output_field: kind.output_field(),
    }
}
