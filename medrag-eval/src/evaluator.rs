//! The evaluator: per-item scoring and batch runs over a pipeline.

use std::sync::Arc;

use medrag::RagPipeline;
use tracing::{info, warn};

use crate::judge::Judge;
use crate::metrics;
use crate::report::{EvalItem, EvalReport, EvalScores};

/// Scores answers against their retrieved context through a [`Judge`].
///
/// Evaluation never fails as a whole: a judge outage marks the affected
/// metric absent and the remaining metrics still report. `overall` is
/// the equal-weight mean of whatever is present.
pub struct Evaluator {
    judge: Arc<dyn Judge>,
}

impl Evaluator {
    /// Create an evaluator over the given judge.
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Evaluate one (question, answer, contexts) triple, with an
    /// optional reference answer enabling `context_recall`.
    ///
    /// The judge sees exactly the inputs passed here — no other context.
    pub async fn evaluate(
        &self,
        question: &str,
        answer: &str,
        contexts: &[String],
        reference: Option<&str>,
    ) -> EvalScores {
        let faithfulness = self
            .run_metric(metrics::FAITHFULNESS, metrics::faithfulness(answer, contexts))
            .await;
        let context_precision = self
            .run_metric(metrics::CONTEXT_PRECISION, metrics::context_precision(question, contexts))
            .await;
        let answer_relevance = self
            .run_metric(metrics::ANSWER_RELEVANCE, metrics::answer_relevance(question, answer))
            .await;
        let context_recall = match reference {
            Some(reference) => {
                self.run_metric(
                    metrics::CONTEXT_RECALL,
                    metrics::context_recall(reference, contexts),
                )
                .await
            }
            None => None,
        };

        EvalScores { faithfulness, context_precision, answer_relevance, context_recall, overall: None }
            .with_overall()
    }

    /// Run a question set through `pipeline` and evaluate each answer
    /// against the exact excerpts it retrieved.
    ///
    /// `references`, when given, pairs with `questions` by position; a
    /// question without a reference is evaluated without
    /// `context_recall`. A per-question pipeline error is recorded on
    /// that row and the batch continues.
    pub async fn evaluate_batch(
        &self,
        pipeline: &RagPipeline,
        questions: &[String],
        references: Option<&[String]>,
    ) -> EvalReport {
        let mut items = Vec::with_capacity(questions.len());

        for (i, question) in questions.iter().enumerate() {
            info!(question = %question, item = i + 1, total = questions.len(), "evaluating");

            match pipeline.query(question).await {
                Ok(response) => {
                    let contexts: Vec<String> =
                        response.sources.iter().map(|s| s.excerpt.clone()).collect();
                    let reference = references.and_then(|r| r.get(i)).map(String::as_str);
                    let scores =
                        self.evaluate(question, &response.answer, &contexts, reference).await;

                    items.push(EvalItem {
                        question: question.clone(),
                        answer: Some(response.answer),
                        confidence: Some(response.confidence),
                        num_sources: response.sources.len(),
                        scores: Some(scores),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(question = %question, error = %e, "pipeline failed, recording error row");
                    items.push(EvalItem {
                        question: question.clone(),
                        answer: None,
                        confidence: None,
                        num_sources: 0,
                        scores: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let report = EvalReport::from_items(items);
        info!(
            items = report.items.len(),
            overall = report.aggregate.overall,
            "batch evaluation completed"
        );
        report
    }

    /// Run one metric, converting a judge failure into an absent score.
    async fn run_metric(&self, name: &str, input: (String, String)) -> Option<f32> {
        let (instruction, payload) = input;
        match self.judge.judge(&instruction, &payload).await {
            Ok(score) => Some(score.clamp(0.0, 1.0)),
            Err(e) => {
                warn!(metric = name, error = %e, "judge unavailable, marking metric absent");
                None
            }
        }
    }
}
