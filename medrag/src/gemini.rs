//! Gemini-backed generator.
//!
//! This module is only available when the `gemini` feature is enabled.
//! Calls the `generateContent` REST endpoint directly with `reqwest`.
//! The same transient/permanent split as the OpenAI adapter applies:
//! rate limits and upstream 5xx responses are retriable, everything else
//! is not.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::generation::{GenerationOptions, Generator};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The default Gemini generation model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// A [`Generator`] backed by the Gemini `generateContent` API.
///
/// # Example
///
/// ```rust,ignore
/// use medrag::gemini::GeminiGenerator;
///
/// let generator = GeminiGenerator::new("your-api-key")?;
/// let text = generator.generate(&prompt, &GenerationOptions::default()).await?;
/// ```
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    /// Create a new generator with the given API key and the default
    /// model (`gemini-2.0-flash`).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Generation {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
                transient: false,
            });
        }

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| {
            RagError::Generation {
                provider: "Gemini".into(),
                message: format!("failed to build HTTP client: {e}"),
                transient: false,
            }
        })?;

        Ok(Self { client, api_key, model: DEFAULT_MODEL.into() })
    }

    /// Create a new generator using the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| RagError::Generation {
            provider: "Gemini".into(),
            message: "GEMINI_API_KEY environment variable not set".into(),
            transient: false,
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gemini-1.5-pro`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        debug!(
            provider = "Gemini",
            model = %self.model,
            prompt_len = prompt.len(),
            "generating"
        );

        let url = format!("{GEMINI_BASE_URL}/{}:generateContent", self.model);
        let request_body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                RagError::Generation {
                    provider: "Gemini".into(),
                    message: format!("request failed: {e}"),
                    transient: true,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!(provider = "Gemini", %status, "API error");
            return Err(RagError::Generation {
                provider: "Gemini".into(),
                message: format!("API returned {status}: {body}"),
                transient: status.as_u16() == 429 || status.is_server_error(),
            });
        }

        let generate_response: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            RagError::Generation {
                provider: "Gemini".into(),
                message: format!("failed to parse response: {e}"),
                transient: false,
            }
        })?;

        let text: String = generate_response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate.content.parts.into_iter().filter_map(|part| part.text).collect::<Vec<_>>().join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(RagError::Generation {
                provider: "Gemini".into(),
                message: "API returned no candidates".into(),
                transient: false,
            });
        }

        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
