//! Evaluation report types.

use serde::{Deserialize, Serialize};

/// Metric scores for one evaluated item, each in `[0, 1]`.
///
/// A `None` metric is explicitly absent: either it was inapplicable
/// (`context_recall` without a reference answer) or the judging
/// mechanism was unavailable for it. Absent metrics are excluded from
/// `overall`, never defaulted to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalScores {
    /// Whether the answer is supported by the retrieved context.
    pub faithfulness: Option<f32>,
    /// Whether the retrieved context is on-topic for the question.
    pub context_precision: Option<f32>,
    /// Whether the answer addresses the question.
    pub answer_relevance: Option<f32>,
    /// Whether the retrieved context covers the reference answer.
    /// Requires a reference; absent otherwise.
    pub context_recall: Option<f32>,
    /// Equal-weight mean of the metrics that are present.
    pub overall: Option<f32>,
}

impl EvalScores {
    /// Compute `overall` as the equal-weight mean of the present metrics.
    pub(crate) fn with_overall(mut self) -> Self {
        let present: Vec<f32> = [
            self.faithfulness,
            self.context_precision,
            self.answer_relevance,
            self.context_recall,
        ]
        .into_iter()
        .flatten()
        .collect();

        self.overall = if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f32>() / present.len() as f32)
        };
        self
    }
}

/// One row of a batch evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalItem {
    /// The evaluated question.
    pub question: String,
    /// The generated answer, when the pipeline succeeded.
    pub answer: Option<String>,
    /// The pipeline's confidence for this answer.
    pub confidence: Option<f32>,
    /// How many sources the answer cites.
    pub num_sources: usize,
    /// Metric scores, when evaluation ran.
    pub scores: Option<EvalScores>,
    /// The pipeline error, when the question could not be answered.
    pub error: Option<String>,
}

/// A batch evaluation report: per-item rows plus aggregate means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Per-question rows, in input order.
    pub items: Vec<EvalItem>,
    /// Mean of each metric over the rows where it is present.
    pub aggregate: EvalScores,
}

impl EvalReport {
    /// Build a report from rows, computing aggregate metric means.
    pub(crate) fn from_items(items: Vec<EvalItem>) -> Self {
        fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
            let values: Vec<f32> = values.collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f32>() / values.len() as f32)
            }
        }

        let scores = || items.iter().filter_map(|item| item.scores.as_ref());
        let aggregate = EvalScores {
            faithfulness: mean(scores().filter_map(|s| s.faithfulness)),
            context_precision: mean(scores().filter_map(|s| s.context_precision)),
            answer_relevance: mean(scores().filter_map(|s| s.answer_relevance)),
            context_recall: mean(scores().filter_map(|s| s.context_recall)),
            overall: None,
        }
        .with_overall();

        Self { items, aggregate }
    }
}
