//! Retrieval engine for docquery
//!
//! This crate reads source documents from a directory, chunks and embeds them into a
//! local vector index, persists that index to disk, and answers queries through a
//! retriever, a similarity filter and an LLM-backed response synthesizer.

mod embedding;
mod engine;
mod index;
mod indexer;
mod postprocessor;
mod pprint;
mod reader;
mod retriever;
mod storage;
mod vector_store;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use embedding::HashEmbedding;
pub use engine::{RetrieverQueryEngine, TEXT_QA_TEMPLATE};
pub use index::{IndexManifest, VectorIndex};
pub use indexer::LocalDocumentIndexer;
pub use postprocessor::{NodePostprocessor, SimilarityPostprocessor, DEFAULT_SIMILARITY_CUTOFF};
pub use pprint::{format_response, format_source_node};
pub use reader::{SimpleDirectoryReader, SourceFingerprint};
pub use retriever::{VectorIndexRetriever, DEFAULT_SIMILARITY_TOP_K};
pub use storage::{get_index, IndexOptions, StalenessPolicy, DEFAULT_DATA_DIR, DEFAULT_PERSIST_DIR};
pub use vector_store::LocalVectorStore;

// Re-export core types for convenience
pub use docquery_core::{
    Document, EmbeddingProvider, Error, IndexingConfig, IndexingResult, LLMProvider,
    NodeWithScore, QueryEngine, Response, Result, SearchConfig, SearchResult, VectorDocument,
    VectorStore,
};
