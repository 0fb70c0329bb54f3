//! Generator trait for producing answer text from an assembled prompt.

use async_trait::async_trait;

use crate::error::Result;

/// Sampling options for a generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature. Defaults low: answer variance is unwelcome
    /// in this domain.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.1, max_tokens: 1000 }
    }
}

/// A capability interface over an external text-generation model.
///
/// The model is a black box: it receives the fully assembled prompt and
/// returns raw text. Failures surface as
/// [`RagError::Generation`](crate::RagError::Generation) preserving the
/// upstream error, with a transient flag set for rate limits and upstream
/// 5xx responses. Callers retry transient failures at most once with
/// backoff and never retry authentication or malformed-request errors.
/// Determinism is not guaranteed.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate raw text for the given prompt.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Return the identifier of the underlying generation model.
    fn model_id(&self) -> &str;
}
