//! Build-or-load access to the persisted index

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use docquery_core::{EmbeddingProvider, Error, IndexingConfig, Result};

use crate::index::VectorIndex;
use crate::indexer::LocalDocumentIndexer;
use crate::reader::SimpleDirectoryReader;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PERSIST_DIR: &str = "./storage";

/// What to do when a persisted index already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalenessPolicy {
    /// Load the persisted index without looking at the source directory
    #[default]
    Trust,
    /// Rebuild when the source files no longer match the persisted fingerprints
    Verify,
    /// Always rebuild from the source directory
    Rebuild,
}

impl FromStr for StalenessPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trust" => Ok(Self::Trust),
            "verify" => Ok(Self::Verify),
            "rebuild" => Ok(Self::Rebuild),
            other => Err(Error::Configuration(format!(
                "Unknown staleness policy '{}', expected trust, verify or rebuild",
                other
            ))),
        }
    }
}

/// Options for [`get_index`]
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub data_dir: PathBuf,
    pub recursive: bool,
    pub policy: StalenessPolicy,
    pub indexing: IndexingConfig,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            recursive: false,
            policy: StalenessPolicy::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

/// Return a ready-to-query index for `persist_dir`.
///
/// If `persist_dir` does not exist, the source documents are read, indexed and the
/// result persisted to `persist_dir`. Otherwise the persisted index is loaded; whether
/// the source directory is consulted at all depends on `options.policy`. Under
/// [`StalenessPolicy::Verify`] an index that fails to load counts as stale.
pub async fn get_index(
    persist_dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    options: &IndexOptions,
) -> Result<VectorIndex> {
    if !persist_dir.exists() {
        tracing::info!(dir = %persist_dir.display(), "no persisted index, building");
        return build_and_persist(persist_dir, embedder, options).await;
    }

    match options.policy {
        StalenessPolicy::Trust => VectorIndex::load(persist_dir, embedder),
        StalenessPolicy::Rebuild => {
            tracing::info!(dir = %persist_dir.display(), "rebuild requested");
            build_and_persist(persist_dir, embedder, options).await
        }
        StalenessPolicy::Verify => {
            let index = match VectorIndex::load(persist_dir, embedder.clone()) {
                Ok(index) => index,
                Err(error) => {
                    tracing::warn!(dir = %persist_dir.display(), error = %error, "persisted index unusable, rebuilding");
                    return build_and_persist(persist_dir, embedder, options).await;
                }
            };

            if index.manifest().sources == reader(options).fingerprint()? {
                Ok(index)
            } else {
                tracing::info!(dir = %persist_dir.display(), "persisted index is stale, rebuilding");
                build_and_persist(persist_dir, embedder, options).await
            }
        }
    }
}

fn reader(options: &IndexOptions) -> SimpleDirectoryReader {
    SimpleDirectoryReader::new(&options.data_dir).recursive(options.recursive)
}

async fn build_and_persist(
    persist_dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    options: &IndexOptions,
) -> Result<VectorIndex> {
    let reader = reader(options);
    let documents = reader.load_data()?;
    let sources = reader.fingerprint()?;

    let indexer = LocalDocumentIndexer::with_config(options.indexing.clone());
    let index = VectorIndex::from_documents(&documents, embedder, &indexer, sources).await?;
    index.persist(persist_dir)?;

    Ok(index)
}
