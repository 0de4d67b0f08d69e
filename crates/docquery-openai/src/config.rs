//! OpenAI configuration

use serde::{Deserialize, Serialize};
use std::env;

use crate::env::OPENAI_API_KEY;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Configuration for the OpenAI client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Checked lazily when a request is made
    pub api_key: Option<String>,
    pub api_base: String,
    pub chat_model: String,
    pub embedding_model: String,
}

impl OpenAIConfig {
    /// Create configuration from environment variables
    ///
    /// Expects `.env` to have been loaded already (see [`crate::load_env_vars`]).
    pub fn from_env() -> Self {
        let api_key = env::var(OPENAI_API_KEY).ok().filter(|k| !k.is_empty());

        let api_base = env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let chat_model = env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        let embedding_model = env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            chat_model,
            embedding_model,
        }
    }

    /// Create configuration with an explicit key and default endpoints
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_base: DEFAULT_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}
