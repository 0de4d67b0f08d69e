//! Offline embedding provider

use async_trait::async_trait;

use docquery_core::{EmbeddingProvider, Result};

const DEFAULT_DIMENSION: usize = 384;

/// Deterministic hashed bag-of-words embedding.
///
/// Needs no network access or credential. Features are derived from md5 so vectors are
/// stable across toolchains and can be persisted.
#[derive(Debug, Clone)]
pub struct HashEmbedding {
    dimension: usize,
    model_id: String,
}

impl HashEmbedding {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            model_id: format!("hash-embedding-{}", dimension.max(1)),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket(&self, feature: &str) -> (usize, usize) {
        let digest = md5::compute(feature.as_bytes()).0;
        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        hi.copy_from_slice(&digest[..8]);
        lo.copy_from_slice(&digest[8..]);
        let (hi, lo) = (u64::from_le_bytes(hi), u64::from_le_bytes(lo));
        let dim = self.dimension as u64;
        ((hi % dim) as usize, (lo % dim) as usize)
    }

    /// Embed a single text
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut embedding = vec![0.0f32; self.dimension];

        for word in &words {
            let (idx1, idx2) = self.bucket(word);
            embedding[idx1] += 1.0;
            embedding[idx2] += 0.5;
        }

        for pair in words.windows(2) {
            let (idx, _) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            embedding[idx] += 0.8;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        embedding
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedding {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
