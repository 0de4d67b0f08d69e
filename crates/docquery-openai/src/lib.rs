//! OpenAI integration for docquery
//!
//! This crate provides the environment loader, plus the OpenAI implementation of the
//! `LLMProvider` and `EmbeddingProvider` traits.

mod client;
mod config;
mod env;

#[cfg(test)]
mod tests;

pub use client::OpenAIClient;
pub use config::OpenAIConfig;
pub use env::{load_env_vars, load_env_vars_from, OPENAI_API_KEY};

// Re-export core types for convenience
pub use docquery_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};
