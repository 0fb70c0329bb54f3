//! Metric instruction and payload builders.
//!
//! Each metric maps to one judge call. The payload carries exactly the
//! question / answer / contexts (and reference, for recall) under test —
//! assembling anything else would leak unretrieved context into the
//! judgment and inflate the scores.

/// Names of the metrics, used in logging and reports.
pub const FAITHFULNESS: &str = "faithfulness";
pub const ANSWER_RELEVANCE: &str = "answer_relevance";
pub const CONTEXT_PRECISION: &str = "context_precision";
pub const CONTEXT_RECALL: &str = "context_recall";

/// Render retrieved contexts as numbered blocks for a judge payload.
fn render_contexts(contexts: &[String]) -> String {
    if contexts.is_empty() {
        return "(no context was retrieved)".to_string();
    }
    contexts
        .iter()
        .enumerate()
        .map(|(i, context)| format!("[{}] {context}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Faithfulness: is every claim in the answer supported by the context?
pub(crate) fn faithfulness(answer: &str, contexts: &[String]) -> (String, String) {
    (
        "Rate how well every factual claim in the answer is supported by the \
         provided context. 1 means fully supported, 0 means contradicted or \
         unsupported."
            .to_string(),
        format!("Context:\n{}\n\nAnswer:\n{answer}", render_contexts(contexts)),
    )
}

/// Answer relevance: does the answer address the question?
pub(crate) fn answer_relevance(question: &str, answer: &str) -> (String, String) {
    (
        "Rate how directly the answer addresses the question. 1 means fully \
         on point, 0 means unrelated or evasive."
            .to_string(),
        format!("Question:\n{question}\n\nAnswer:\n{answer}"),
    )
}

/// Context precision: is the retrieved context on-topic for the question?
pub(crate) fn context_precision(question: &str, contexts: &[String]) -> (String, String) {
    (
        "Rate how much of the provided context is relevant to answering the \
         question. 1 means every passage is on-topic, 0 means none are."
            .to_string(),
        format!("Question:\n{question}\n\nContext:\n{}", render_contexts(contexts)),
    )
}

/// Context recall: does the retrieved context cover the reference answer?
pub(crate) fn context_recall(reference: &str, contexts: &[String]) -> (String, String) {
    (
        "Rate how much of the reference answer can be attributed to the \
         provided context. 1 means everything needed was retrieved, 0 means \
         nothing was."
            .to_string(),
        format!("Reference answer:\n{reference}\n\nContext:\n{}", render_contexts(contexts)),
    )
}
