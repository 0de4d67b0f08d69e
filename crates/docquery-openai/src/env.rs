//! `.env` loading for the API credential

use std::env;
use std::path::Path;

/// Environment key carrying the API credential
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Load `.env` from the working directory (or an ancestor) and return the API key.
///
/// A missing file or key is not an error: the key simply stays unset.
pub fn load_env_vars() -> Option<String> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("no .env file found"),
        Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
    }
    read_key(OPENAI_API_KEY)
}

/// Load an explicit environment file and return the value of `key`.
///
/// Variables already present in the process environment are not overridden.
pub fn load_env_vars_from(path: impl AsRef<Path>, key: &str) -> Option<String> {
    let path = path.as_ref();
    if let Err(e) = dotenvy::from_path(path) {
        tracing::debug!(path = %path.display(), error = %e, "environment file not loaded");
    }
    read_key(key)
}

fn read_key(key: &str) -> Option<String> {
    let value = env::var(key).ok().filter(|v| !v.is_empty());
    if value.is_none() {
        tracing::warn!(key, "credential not set; requests to the API will fail");
    }
    value
}
