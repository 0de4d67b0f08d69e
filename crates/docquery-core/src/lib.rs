//! Core traits and types for docquery
//!
//! This crate defines the fundamental traits and types shared by the docquery crates:
//! LLM providers, embedding providers, vector stores and query engines. The concrete
//! implementations live in `docquery-openai` and `docquery-rag`, which keeps the web
//! layer and the index accessor testable against in-process doubles.

pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod query;
pub mod vector_store;

#[cfg(test)]
mod tests;

pub use document::{Document, IndexingConfig, IndexingResult};
pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use query::{NodeWithScore, QueryEngine, Response, EMPTY_RESPONSE};
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
