//! Vector index and its on-disk format

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docquery_core::{Document, EmbeddingProvider, Error, Result, VectorDocument, VectorStore};

use crate::indexer::LocalDocumentIndexer;
use crate::reader::SourceFingerprint;
use crate::vector_store::LocalVectorStore;

const DOCSTORE_FILE: &str = "docstore.json";
const VECTOR_STORE_FILE: &str = "vector_store.json";
const INDEX_STORE_FILE: &str = "index_store.json";

const FORMAT_VERSION: u32 = 1;

/// Metadata persisted alongside the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub version: u32,
    pub built_at: String,
    pub embedding_model: String,
    pub dimension: Option<usize>,
    pub node_count: usize,
    pub sources: Vec<SourceFingerprint>,
}

#[derive(Serialize, Deserialize)]
struct StoredNode {
    id: String,
    content: String,
    metadata: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct DocStore {
    nodes: Vec<StoredNode>,
}

#[derive(Serialize, Deserialize)]
struct VectorData {
    dimension: Option<usize>,
    embedding_dict: BTreeMap<String, Vec<f32>>,
}

/// Queryable index: nodes with embeddings, plus the provider used to embed queries
pub struct VectorIndex {
    store: LocalVectorStore,
    manifest: IndexManifest,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorIndex {
    /// Chunk, embed and store the given documents
    pub async fn from_documents(
        documents: &[Document],
        embedder: Arc<dyn EmbeddingProvider>,
        indexer: &LocalDocumentIndexer,
        sources: Vec<SourceFingerprint>,
    ) -> Result<Self> {
        let (nodes, result) = indexer.build_nodes(documents, embedder.as_ref()).await?;

        let mut store = LocalVectorStore::new();
        store.store_batch(nodes)?;

        tracing::info!(
            documents = result.documents_indexed,
            nodes = result.nodes_indexed,
            "built vector index"
        );

        let manifest = IndexManifest {
            version: FORMAT_VERSION,
            built_at: Utc::now().to_rfc3339(),
            embedding_model: embedder.model_id().to_string(),
            dimension: store.dimension(),
            node_count: store.count(),
            sources,
        };

        Ok(Self {
            store,
            manifest,
            embedder,
        })
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn store(&self) -> &LocalVectorStore {
        &self.store
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Write the index to `dir`, replacing whatever is there.
    ///
    /// Files are written to a staging directory next to `dir` and moved into place, so
    /// a failed write never leaves a half-populated `dir` behind. An existing index is
    /// moved aside first and only deleted once the new one is in place.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let parent = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".docquery-staging-")
            .tempdir_in(parent)?;

        let docstore = DocStore {
            nodes: self
                .store
                .documents()
                .map(|doc| StoredNode {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                })
                .collect(),
        };

        let vectors = VectorData {
            dimension: self.store.dimension(),
            embedding_dict: self
                .store
                .documents()
                .filter_map(|doc| doc.embedding.clone().map(|e| (doc.id.clone(), e)))
                .collect(),
        };

        write_json(&staging.path().join(DOCSTORE_FILE), &docstore)?;
        write_json(&staging.path().join(VECTOR_STORE_FILE), &vectors)?;
        write_json(&staging.path().join(INDEX_STORE_FILE), &self.manifest)?;

        replace_dir(staging.path(), dir)?;

        tracing::info!(dir = %dir.display(), nodes = self.manifest.node_count, "persisted index");
        Ok(())
    }

    /// Read an index previously written by [`VectorIndex::persist`]
    pub fn load(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let docstore: DocStore = read_json(&dir.join(DOCSTORE_FILE))?;
        let mut vectors: VectorData = read_json(&dir.join(VECTOR_STORE_FILE))?;
        let manifest: IndexManifest = read_json(&dir.join(INDEX_STORE_FILE))?;

        if manifest.version != FORMAT_VERSION {
            return Err(Error::Storage(format!(
                "Unsupported index format version {} in {}",
                manifest.version,
                dir.display()
            )));
        }

        let mut store = LocalVectorStore::new();
        for node in docstore.nodes {
            let embedding = vectors.embedding_dict.remove(&node.id).ok_or_else(|| {
                Error::Storage(format!("Node {} has no stored embedding", node.id))
            })?;
            store.store(VectorDocument {
                id: node.id,
                content: node.content,
                embedding: Some(embedding),
                metadata: node.metadata,
                score: None,
            })?;
        }

        if store.dimension() != vectors.dimension {
            return Err(Error::Storage(format!(
                "Stored dimension {:?} does not match embeddings ({:?})",
                vectors.dimension,
                store.dimension()
            )));
        }

        if manifest.embedding_model != embedder.model_id() {
            return Err(Error::Storage(format!(
                "Index in {} was built with embedding model {}, but {} is configured; rebuild it with --staleness rebuild",
                dir.display(),
                manifest.embedding_model,
                embedder.model_id()
            )));
        }

        tracing::info!(dir = %dir.display(), nodes = store.count(), "loaded persisted index");

        Ok(Self {
            store,
            manifest,
            embedder,
        })
    }
}

/// Move `staging` to `dir`, restoring the previous `dir` if the move fails
fn replace_dir(staging: &Path, dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::rename(staging, dir)?;
        return Ok(());
    }

    let mut previous = dir.as_os_str().to_owned();
    previous.push(".previous");
    let previous = PathBuf::from(previous);
    if previous.exists() {
        fs::remove_dir_all(&previous)?;
    }
    fs::rename(dir, &previous)?;

    if let Err(e) = fs::rename(staging, dir) {
        if let Err(restore) = fs::rename(&previous, dir) {
            tracing::error!(
                error = %restore,
                previous = %previous.display(),
                "failed to restore previous index"
            );
        }
        return Err(e.into());
    }

    fs::remove_dir_all(&previous)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashEmbedding;
    use serde_json::json;

    fn documents() -> Vec<Document> {
        vec![
            Document {
                id: "a.txt".to_string(),
                text: "Rust has ownership.\n\nBorrowing is checked at compile time.".to_string(),
                metadata: json!({"file_name": "a.txt"}),
            },
            Document {
                id: "b.txt".to_string(),
                text: "Bread needs flour and water.".to_string(),
                metadata: json!({"file_name": "b.txt"}),
            },
        ]
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let persist_dir = dir.path().join("storage");
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedding::with_dimension(16));

        let index = VectorIndex::from_documents(&documents(), embedder.clone(), &LocalDocumentIndexer::new(), Vec::new())
            .await
            .unwrap();
        index.persist(&persist_dir).unwrap();

        for file in [DOCSTORE_FILE, VECTOR_STORE_FILE, INDEX_STORE_FILE] {
            assert!(persist_dir.join(file).is_file(), "{} missing", file);
        }

        let loaded = VectorIndex::load(&persist_dir, embedder).unwrap();
        assert_eq!(loaded.manifest(), index.manifest());
        assert_eq!(loaded.store().count(), 2);

        let original: Vec<&VectorDocument> = index.store().documents().collect();
        let reloaded: Vec<&VectorDocument> = loaded.store().documents().collect();
        assert_eq!(original, reloaded);

        // No staging directories left behind
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().starts_with(".docquery-staging-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_load_rejects_missing_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedding::with_dimension(8));
        let index = VectorIndex::from_documents(&documents(), embedder.clone(), &LocalDocumentIndexer::new(), Vec::new())
            .await
            .unwrap();
        let persist_dir = dir.path().join("storage");
        index.persist(&persist_dir).unwrap();

        write_json(
            &persist_dir.join(VECTOR_STORE_FILE),
            &VectorData {
                dimension: Some(8),
                embedding_dict: BTreeMap::new(),
            },
        )
        .unwrap();

        let err = VectorIndex::load(&persist_dir, embedder).err().unwrap();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_persist_replaces_existing_index() {
        let dir = tempfile::tempdir().unwrap();
        let persist_dir = dir.path().join("storage");
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedding::with_dimension(8));
        let indexer = LocalDocumentIndexer::new();

        let first = VectorIndex::from_documents(&documents(), embedder.clone(), &indexer, Vec::new())
            .await
            .unwrap();
        first.persist(&persist_dir).unwrap();

        let second = VectorIndex::from_documents(&documents()[..1], embedder.clone(), &indexer, Vec::new())
            .await
            .unwrap();
        second.persist(&persist_dir).unwrap();

        let loaded = VectorIndex::load(&persist_dir, embedder).unwrap();
        assert_eq!(loaded.store().count(), 1);

        let entries: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["storage".to_string()]);
    }

    #[test]
    fn test_failed_replace_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let persist_dir = dir.path().join("storage");
        fs::create_dir_all(&persist_dir).unwrap();
        fs::write(persist_dir.join(INDEX_STORE_FILE), "{}").unwrap();

        let missing_staging = dir.path().join("never-written");
        assert!(replace_dir(&missing_staging, &persist_dir).is_err());

        assert_eq!(fs::read_to_string(persist_dir.join(INDEX_STORE_FILE)).unwrap(), "{}");
        assert!(!dir.path().join("storage.previous").exists());
    }

    #[tokio::test]
    async fn test_load_rejects_different_embedding_model() {
        let dir = tempfile::tempdir().unwrap();
        let persist_dir = dir.path().join("storage");
        let built_with: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedding::with_dimension(16));
        let index = VectorIndex::from_documents(&documents(), built_with, &LocalDocumentIndexer::new(), Vec::new())
            .await
            .unwrap();
        index.persist(&persist_dir).unwrap();

        let configured: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedding::with_dimension(8));
        let err = VectorIndex::load(&persist_dir, configured).err().unwrap();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("hash-embedding-16"));
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedding::new());
        let err = VectorIndex::load(&dir.path().join("nothing"), embedder).err().unwrap();
        assert!(err.to_string().contains("docstore.json"));
    }
}
