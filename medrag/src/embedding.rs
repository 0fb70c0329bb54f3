//! Embedder trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A capability interface over an external sentence-embedding model.
///
/// Implementations wrap specific embedding backends (hosted APIs, local
/// models) behind a unified async interface. Embedding is treated as a
/// pure function of the input text; failures surface as
/// [`RagError::Embedding`](crate::RagError::Embedding) with a transient
/// flag the caller can use to decide on a backoff retry.
///
/// Embeddings are not comparable across models: [`model_id`](Embedder::model_id)
/// is recorded in every index artifact, and querying an index built with
/// a different model identifier fails fast rather than silently computing
/// meaningless similarity scores.
///
/// # Example
///
/// ```rust,ignore
/// use medrag::Embedder;
///
/// let embedder = MockEmbedder::new(256);
/// let embedding = embedder.embed("hello world").await?;
/// assert_eq!(embedding.len(), embedder.dimensions());
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, preserving
    /// input order.
    ///
    /// The default implementation calls [`embed`](Embedder::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this embedder.
    fn dimensions(&self) -> usize;

    /// Return the identifier of the underlying embedding model.
    fn model_id(&self) -> &str;
}
