//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Turns text into dense vectors.
///
/// Implementations must return one vector per input text, in input order, and every
/// vector must have the same dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_texts(&[query.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::Embedding("Provider returned no vector for query".to_string()))
    }

    /// Identifier of the embedding model, recorded in the persisted index
    fn model_id(&self) -> &str;
}
