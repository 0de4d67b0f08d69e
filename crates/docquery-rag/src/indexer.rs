//! Document chunking and embedding

use serde_json::json;

use docquery_core::{Document, EmbeddingProvider, IndexingConfig, IndexingResult, Result, VectorDocument};

/// Splits documents into nodes and embeds them in batches
#[derive(Debug, Clone, Default)]
pub struct LocalDocumentIndexer {
    config: IndexingConfig,
}

impl LocalDocumentIndexer {
    /// Create a new local document indexer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: IndexingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// Chunk every document and embed the chunks.
    ///
    /// Returns nodes in document order, then chunk order.
    pub async fn build_nodes(
        &self,
        documents: &[Document],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<(Vec<VectorDocument>, IndexingResult)> {
        let mut nodes = Vec::new();

        for document in documents {
            let chunks = self.chunk_document(&document.text);
            let total_chunks = chunks.len();

            for (i, chunk) in chunks.into_iter().enumerate() {
                let mut metadata = document.metadata.clone();
                metadata["chunk_index"] = json!(i);
                metadata["total_chunks"] = json!(total_chunks);
                metadata["ref_doc_id"] = json!(document.id);

                nodes.push(VectorDocument {
                    id: format!("{:x}-{}", md5::compute(document.id.as_bytes()), i),
                    content: chunk,
                    embedding: None,
                    metadata,
                    score: None,
                });
            }
        }

        let batch_size = self.config.batch_size.max(1);
        let total_batches = nodes.len().div_ceil(batch_size);

        for (batch_index, batch) in nodes.chunks_mut(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|node| node.content.clone()).collect();
            let embeddings = embedder.embed_texts(&texts).await?;

            for (node, embedding) in batch.iter_mut().zip(embeddings) {
                node.embedding = Some(embedding);
            }

            tracing::info!(
                batch = batch_index + 1,
                total = total_batches,
                "generated embeddings"
            );
        }

        let result = IndexingResult {
            documents_indexed: documents.len(),
            nodes_indexed: nodes.len(),
        };

        Ok((nodes, result))
    }

    /// Split text into chunks of at most `chunk_size` characters.
    ///
    /// Paragraphs are packed together while they fit; an oversized paragraph is split
    /// by sentences, and an oversized sentence by character windows.
    pub fn chunk_document(&self, text: &str) -> Vec<String> {
        let chunk_size = self.config.chunk_size.max(1);
        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }

            let pieces = if char_len(paragraph) <= chunk_size {
                vec![paragraph.to_string()]
            } else {
                split_into_sentences(paragraph)
                    .into_iter()
                    .flat_map(|sentence| split_by_chars(&sentence, chunk_size))
                    .collect()
            };

            for piece in pieces {
                let separator = if current.is_empty() { 0 } else { 2 };
                if char_len(&current) + separator + char_len(&piece) > chunk_size && !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(&piece);
            }
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_by_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// Sentence splitting that does not break inside decimals
fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current_sentence = String::new();
    let chars: Vec<char> = text.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        current_sentence.push(ch);

        if ch == '.' || ch == '!' || ch == '?' {
            // Not a sentence end if followed by a lowercase letter or digit
            let is_sentence_end = match chars.get(i + 1) {
                Some(next_char) => !next_char.is_ascii_lowercase() && !next_char.is_ascii_digit(),
                None => true,
            };

            if is_sentence_end && current_sentence.trim().len() > 10 {
                sentences.push(current_sentence.trim().to_string());
                current_sentence.clear();
            }
        }
    }

    if !current_sentence.trim().is_empty() {
        sentences.push(current_sentence.trim().to_string());
    }

    sentences
}
