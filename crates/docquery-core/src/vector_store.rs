//! Vector store trait and types

use serde::{Deserialize, Serialize};

use crate::Result;

/// A node (document chunk) stored in the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: serde_json::Value,
    pub score: Option<f32>,
}

/// Search result from vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<VectorDocument>,
    pub total: usize,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
        }
    }
}

/// Trait for vector stores
///
/// The store is built once and then only read, so every operation is synchronous and
/// takes `&self` for reads.
pub trait VectorStore: Send + Sync {
    /// Store a document, replacing any document with the same ID
    fn store(&mut self, document: VectorDocument) -> Result<String>;

    /// Store multiple documents in batch
    fn store_batch(&mut self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        documents.into_iter().map(|doc| self.store(doc)).collect()
    }

    /// Search using a vector embedding
    fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Get a document by ID
    fn get(&self, id: &str) -> Option<&VectorDocument>;

    /// Get the total number of documents
    fn count(&self) -> usize;
}
