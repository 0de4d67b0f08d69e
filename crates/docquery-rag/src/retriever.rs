//! Top-k retrieval over a vector index

use std::sync::Arc;

use docquery_core::{NodeWithScore, Result, SearchConfig, VectorStore};

use crate::index::VectorIndex;

pub const DEFAULT_SIMILARITY_TOP_K: usize = 4;

/// Returns the `similarity_top_k` nodes most similar to a query
#[derive(Clone)]
pub struct VectorIndexRetriever {
    index: Arc<VectorIndex>,
    similarity_top_k: usize,
}

impl VectorIndexRetriever {
    pub fn new(index: Arc<VectorIndex>, similarity_top_k: usize) -> Self {
        Self {
            index,
            similarity_top_k,
        }
    }

    pub fn similarity_top_k(&self) -> usize {
        self.similarity_top_k
    }

    /// Embed the query and return the best matches, highest score first
    pub async fn retrieve(&self, query: &str) -> Result<Vec<NodeWithScore>> {
        let query_embedding = self.index.embedder().embed_query(query).await?;

        let config = SearchConfig {
            top_k: self.similarity_top_k,
            score_threshold: None,
        };
        let result = self.index.store().search_by_vector(&query_embedding, &config)?;

        tracing::debug!(query, hits = result.total, "retrieved nodes");

        Ok(result
            .documents
            .into_iter()
            .map(|doc| {
                let score = doc.score;
                NodeWithScore::new(doc, score)
            })
            .collect())
    }
}
