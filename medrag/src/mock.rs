//! Deterministic mock adapters for tests and offline development.
//!
//! [`MockEmbedder`] maps text to a bag-of-words vector over hashed token
//! buckets, so lexically overlapping texts get high cosine similarity and
//! unrelated texts get none — a deterministic stand-in for a sentence
//! embedding model. [`MockGenerator`] returns scripted responses and
//! counts calls, which is what refusal-path and retry tests need.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generation::{GenerationOptions, Generator};

/// 64-bit FNV-1a over a token. Deterministic across platforms and runs.
fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// A deterministic embedder hashing tokens into a fixed number of buckets.
///
/// Tokens are lowercased, split on non-alphanumeric characters, and a
/// trailing `s` is stripped from longer tokens as a crude stem so
/// singular and plural forms share a bucket. The resulting count vector
/// is L2-normalized; an all-whitespace input embeds to the zero vector.
pub struct MockEmbedder {
    dimensions: usize,
    model_id: String,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, model_id: "mock-embedder".to_string() }
    }

    /// Override the reported model identifier.
    ///
    /// Useful for exercising the index/query model-mismatch check.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let token = if token.len() >= 4 && token.ends_with('s') {
                &token[..token.len() - 1]
            } else {
                token
            };
            let bucket = (fnv1a(token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

enum MockStep {
    Reply(String),
    TransientFailure(String),
    PermanentFailure(String),
}

/// A scripted generator for tests.
///
/// Scripted steps are consumed in order; once exhausted, every further
/// call returns the default reply. [`call_count`](MockGenerator::call_count)
/// reports how many times [`generate`](Generator::generate) ran — the
/// refusal path asserts it stays at zero.
pub struct MockGenerator {
    default_reply: String,
    steps: Mutex<VecDeque<MockStep>>,
    calls: AtomicUsize,
}

impl MockGenerator {
    /// Create a generator that always returns `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            default_reply: reply.into(),
            steps: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a one-off reply ahead of the default.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.steps.lock().expect("mock lock").push_back(MockStep::Reply(text.into()));
        self
    }

    /// Queue a transient failure (retriable) ahead of the default reply.
    pub fn with_transient_failure(self, message: impl Into<String>) -> Self {
        self.steps.lock().expect("mock lock").push_back(MockStep::TransientFailure(message.into()));
        self
    }

    /// Queue a permanent failure (never retried) ahead of the default reply.
    pub fn with_permanent_failure(self, message: impl Into<String>) -> Self {
        self.steps.lock().expect("mock lock").push_back(MockStep::PermanentFailure(message.into()));
        self
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = self.steps.lock().expect("mock lock").pop_front();
        match step {
            Some(MockStep::Reply(text)) => Ok(text),
            Some(MockStep::TransientFailure(message)) => Err(RagError::Generation {
                provider: "mock".to_string(),
                message,
                transient: true,
            }),
            Some(MockStep::PermanentFailure(message)) => Err(RagError::Generation {
                provider: "mock".to_string(),
                message,
                transient: false,
            }),
            None => Ok(self.default_reply.clone()),
        }
    }

    fn model_id(&self) -> &str {
        "mock-generator"
    }
}
