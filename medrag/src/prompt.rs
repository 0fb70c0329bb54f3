//! Grounded prompt assembly and citation-marker parsing.
//!
//! The assembled prompt pairs a system instruction that forbids answering
//! from outside the provided context with a numbered block of retrieved
//! passages. Each passage renders as a `[DOC_i]` block, most relevant
//! first — generators weight early context more heavily, so the best
//! evidence leads.

use std::sync::OnceLock;

use regex::Regex;

use crate::document::SearchResult;

/// The fixed answer returned when retrieval produces no usable context.
pub const REFUSAL_ANSWER: &str = "I'm sorry, I don't have enough verified information to answer \
     that safely. Please consult with a healthcare professional for accurate medical advice.";

/// The disclaimer every answer must end with.
pub const MEDICAL_DISCLAIMER: &str = "This information is for educational purposes only and is \
     not a substitute for professional medical advice.";

/// Warning attached to refused responses.
pub const INSUFFICIENT_CONTEXT_WARNING: &str = "Insufficient verified information available. \
     Please consult a healthcare professional.";

/// Warning attached to every generated response.
pub const GENERAL_WARNING: &str =
    "Always consult with qualified healthcare professionals for medical decisions.";

/// Formats retrieved passages into a citation-tagged grounded prompt.
///
/// Blocks are numbered in descending similarity order. When the
/// concatenated blocks exceed the configured character budget, the
/// lowest-ranked blocks are dropped whole — truncating mid-chunk would
/// hand the generator fabricated partial evidence. The top-ranked block
/// is always included.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    max_context_chars: usize,
}

impl PromptAssembler {
    /// Create an assembler with the given context character budget.
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Assemble the full grounded prompt for `question` over the
    /// retrieved `results` (ordered by descending similarity).
    pub fn assemble(&self, question: &str, results: &[SearchResult]) -> String {
        let mut blocks: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, result)| render_block(i + 1, result))
            .collect();

        // Enforce the context budget by dropping lowest-ranked blocks whole.
        let mut total: usize = blocks.iter().map(|b| b.chars().count()).sum();
        while total > self.max_context_chars && blocks.len() > 1 {
            if let Some(dropped) = blocks.pop() {
                total -= dropped.chars().count();
            }
        }

        let context = blocks.join("\n");

        format!(
            "You are a medical question-answering assistant that provides fact-based, \
             reliable, and explainable answers.\n\
             You are connected to a retrieval system that supplies verified medical documents.\n\
             Answer the user's question using ONLY the information in the retrieved context below.\n\
             \n\
             Rules:\n\
             1. Use clear, simple language while maintaining medical accuracy.\n\
             2. Every factual claim MUST carry a citation in the format [DOC_X] where X is the \
             number of a context block below.\n\
             3. If the retrieved context does not answer the question, reply exactly: \
             \"{REFUSAL_ANSWER}\"\n\
             4. NEVER fabricate or infer medical facts that are not present in the retrieved \
             context.\n\
             5. Do NOT diagnose users or prescribe treatments. Your purpose is to inform, not \
             diagnose.\n\
             6. End your answer with: \"{MEDICAL_DISCLAIMER}\"\n\
             \n\
             Retrieved Context:\n\
             {context}\n\
             \n\
             User Question: {question}\n\
             \n\
             Provide your answer with inline citations:"
        )
    }
}

/// Render one retrieved passage as a numbered context block.
fn render_block(number: usize, result: &SearchResult) -> String {
    let chunk = &result.chunk;
    let title = chunk.metadata.get("title").map(String::as_str).unwrap_or(&chunk.document_id);
    let source = chunk.metadata.get("source").map(String::as_str).unwrap_or("unknown");
    let year = chunk.metadata.get("year").map(String::as_str).unwrap_or("N/A");

    format!(
        "[DOC_{number}] {title} ({source}, {year})\nContent: {}\nRelevance Score: {:.3}\n",
        chunk.text, result.score
    )
}

/// Extract the distinct `[DOC_i]` indices cited in an answer, in order of
/// first appearance.
///
/// Used to check citation grounding: every extracted index must refer to
/// a block number present in the prompt the answer was generated from.
pub fn cited_indices(answer: &str) -> Vec<usize> {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let marker = MARKER.get_or_init(|| Regex::new(r"\[DOC_(\d+)\]").expect("valid regex"));

    let mut seen = Vec::new();
    for capture in marker.captures_iter(answer) {
        if let Ok(index) = capture[1].parse::<usize>() {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
    }
    seen
}
