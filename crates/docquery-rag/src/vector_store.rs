//! Local in-memory vector store

use std::cmp::Ordering;
use std::collections::HashMap;

use docquery_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

/// In-memory vector store with exhaustive cosine search.
///
/// Documents keep their insertion order, which is also the tie-break order for equal
/// scores.
#[derive(Debug, Default)]
pub struct LocalVectorStore {
    documents: Vec<VectorDocument>,
    positions: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl LocalVectorStore {
    /// Create a new local vector store
    pub fn new() -> Self {
        Self::default()
    }

    /// Embedding dimension, fixed by the first stored document
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// All documents in insertion order
    pub fn documents(&self) -> impl Iterator<Item = &VectorDocument> {
        self.documents.iter()
    }
}

/// Cosine similarity between two vectors; 0.0 for mismatched or zero vectors
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

impl VectorStore for LocalVectorStore {
    fn store(&mut self, mut document: VectorDocument) -> Result<String> {
        let embedding = document
            .embedding
            .as_ref()
            .ok_or_else(|| Error::VectorStore(format!("Document {} has no embedding", document.id)))?;

        match self.dimension {
            None => self.dimension = Some(embedding.len()),
            Some(dim) if dim != embedding.len() => {
                return Err(Error::VectorStore(format!(
                    "Embedding dimension mismatch for {}: expected {}, got {}",
                    document.id,
                    dim,
                    embedding.len()
                )));
            }
            Some(_) => {}
        }

        document.score = None;
        let id = document.id.clone();

        match self.positions.get(&id) {
            Some(&pos) => self.documents[pos] = document,
            None => {
                self.positions.insert(id.clone(), self.documents.len());
                self.documents.push(document);
            }
        }

        Ok(id)
    }

    fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        if let Some(dim) = self.dimension.filter(|&dim| dim != vector.len()) {
            return Err(Error::VectorStore(format!(
                "Query embedding has dimension {}, index expects {}",
                vector.len(),
                dim
            )));
        }

        let mut scored: Vec<(f32, &VectorDocument)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                doc.embedding
                    .as_ref()
                    .map(|embedding| (cosine_similarity(vector, embedding), doc))
            })
            .filter(|(score, _)| config.score_threshold.is_none_or(|threshold| *score >= threshold))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(config.top_k);

        let documents: Vec<VectorDocument> = scored
            .into_iter()
            .map(|(score, doc)| {
                let mut doc_with_score = doc.clone();
                doc_with_score.score = Some(score);
                doc_with_score
            })
            .collect();

        let total = documents.len();

        Ok(SearchResult { documents, total })
    }

    fn get(&self, id: &str) -> Option<&VectorDocument> {
        self.positions.get(id).map(|&pos| &self.documents[pos])
    }

    fn count(&self) -> usize {
        self.documents.len()
    }
}
