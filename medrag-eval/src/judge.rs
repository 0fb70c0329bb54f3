//! The judging capability and its implementations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use medrag::{GenerationOptions, Generator};
use regex::Regex;
use tracing::debug;

use crate::error::{EvalError, Result};

/// A capability interface over an external judging mechanism.
///
/// A judge receives a metric instruction and a payload (the exact
/// question / answer / context under test) and returns a score in
/// `[0, 1]`. Transport failures surface as [`EvalError::Judge`]; the
/// evaluator turns them into explicitly absent metrics rather than
/// zeros.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Score one metric payload.
    async fn judge(&self, instruction: &str, payload: &str) -> Result<f32>;
}

/// A [`Judge`] backed by any [`medrag::Generator`].
///
/// The judge prompt asks for a single number; the reply is parsed
/// strictly — the first numeric token is taken, and anything outside
/// `[0, 1]` (or a reply with no number at all) is an
/// [`EvalError::InvalidScore`]. Temperature is pinned to 0 so repeated
/// judgments are as stable as the backing model allows.
pub struct LlmJudge {
    generator: Arc<dyn Generator>,
    options: GenerationOptions,
}

impl LlmJudge {
    /// Create a judge over the given generator.
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator, options: GenerationOptions { temperature: 0.0, max_tokens: 16 } }
    }
}

/// Extract the first numeric token of a judge reply.
fn parse_score(raw: &str) -> Result<f32> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| Regex::new(r"\d*\.?\d+").expect("valid regex"));

    let score = number
        .find(raw)
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .ok_or_else(|| EvalError::InvalidScore { raw: raw.to_string() })?;

    if !(0.0..=1.0).contains(&score) {
        return Err(EvalError::InvalidScore { raw: raw.to_string() });
    }
    Ok(score)
}

#[async_trait]
impl Judge for LlmJudge {
    async fn judge(&self, instruction: &str, payload: &str) -> Result<f32> {
        let prompt = format!(
            "{instruction}\n\n{payload}\n\n\
             Reply with a single number between 0 and 1 and nothing else."
        );

        let raw = self
            .generator
            .generate(&prompt, &self.options)
            .await
            .map_err(|e| EvalError::Judge { message: e.to_string() })?;

        let score = parse_score(&raw)?;
        debug!(score, "judge scored");
        Ok(score)
    }
}

enum MockVerdict {
    Score(f32),
    Failure(String),
}

/// A scripted judge for tests.
///
/// Verdicts are consumed in order; once exhausted, further calls return
/// the default score. Every call's `(instruction, payload)` pair is
/// recorded so tests can assert exactly what the judge was shown.
pub struct MockJudge {
    default_score: f32,
    verdicts: Mutex<VecDeque<MockVerdict>>,
    seen: Mutex<Vec<(String, String)>>,
}

impl MockJudge {
    /// Create a judge that always returns `score`.
    pub fn new(score: f32) -> Self {
        Self {
            default_score: score,
            verdicts: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-off score ahead of the default.
    pub fn with_score(self, score: f32) -> Self {
        self.verdicts.lock().expect("mock lock").push_back(MockVerdict::Score(score));
        self
    }

    /// Queue a judge failure ahead of the default.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.verdicts.lock().expect("mock lock").push_back(MockVerdict::Failure(message.into()));
        self
    }

    /// Every `(instruction, payload)` pair this judge has been shown.
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl Judge for MockJudge {
    async fn judge(&self, instruction: &str, payload: &str) -> Result<f32> {
        self.seen
            .lock()
            .expect("mock lock")
            .push((instruction.to_string(), payload.to_string()));

        let verdict = self.verdicts.lock().expect("mock lock").pop_front();
        match verdict {
            Some(MockVerdict::Score(score)) => Ok(score),
            Some(MockVerdict::Failure(message)) => Err(EvalError::Judge { message }),
            None => Ok(self.default_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_score;

    #[test]
    fn parses_plain_and_embedded_numbers() {
        assert_eq!(parse_score("0.85").unwrap(), 0.85);
        assert_eq!(parse_score("Score: 0.4").unwrap(), 0.4);
        assert_eq!(parse_score("1").unwrap(), 1.0);
        assert_eq!(parse_score(".5").unwrap(), 0.5);
    }

    #[test]
    fn rejects_out_of_range_and_numberless_replies() {
        assert!(parse_score("42").is_err());
        assert!(parse_score("very faithful").is_err());
        assert!(parse_score("").is_err());
    }
}
