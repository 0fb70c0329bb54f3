//! # medrag-eval
//!
//! Answer-quality evaluation for [`medrag`] pipelines.
//!
//! Four metrics, each a single judged score in `[0, 1]`:
//!
//! - **faithfulness** — is the answer supported by the retrieved context?
//! - **answer_relevance** — does the answer address the question?
//! - **context_precision** — was the retrieved context on-topic?
//! - **context_recall** — was everything needed retrieved? (requires a
//!   reference answer; explicitly absent otherwise)
//!
//! Judging is delegated to an external mechanism behind the [`Judge`]
//! trait — typically another generation call through [`LlmJudge`]. The
//! evaluator's own responsibility is to assemble the judge's input
//! faithfully (exact question/answer/context alignment, nothing leaked
//! in) and to aggregate the sub-scores into an equal-weight `overall`.
//! When the judge is unreachable, the affected metric is reported as
//! `None` — never silently zero.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medrag_eval::{Evaluator, LlmJudge};
//!
//! let judge = Arc::new(LlmJudge::new(generator));
//! let evaluator = Evaluator::new(judge);
//! let report = evaluator.evaluate_batch(&pipeline, &questions, Some(&references)).await;
//! println!("overall: {:?}", report.aggregate.overall);
//! ```

pub mod error;
pub mod evaluator;
pub mod judge;
pub mod metrics;
pub mod report;

pub use error::{EvalError, Result};
pub use evaluator::Evaluator;
pub use judge::{Judge, LlmJudge, MockJudge};
pub use report::{EvalItem, EvalReport, EvalScores};
