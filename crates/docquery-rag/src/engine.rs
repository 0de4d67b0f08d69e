//! Retriever-backed query engine

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use docquery_core::{LLMProvider, NodeWithScore, QueryEngine, Response, Result};

use crate::postprocessor::NodePostprocessor;
use crate::retriever::VectorIndexRetriever;

/// Prompt used to answer a query from retrieved context
pub const TEXT_QA_TEMPLATE: &str = "Context information is below.\n\
---------------------\n\
{context_str}\n\
---------------------\n\
Given the context information and not prior knowledge, answer the query.\n\
Query: {query_str}\n\
Answer: ";

/// Retrieves nodes, filters them, and synthesizes an answer with an LLM
pub struct RetrieverQueryEngine {
    retriever: VectorIndexRetriever,
    node_postprocessors: Vec<Box<dyn NodePostprocessor>>,
    llm: Arc<dyn LLMProvider>,
}

impl RetrieverQueryEngine {
    pub fn new(retriever: VectorIndexRetriever, llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            retriever,
            node_postprocessors: Vec::new(),
            llm,
        }
    }

    /// Append a postprocessor; postprocessors run in insertion order
    pub fn with_postprocessor(mut self, postprocessor: impl NodePostprocessor + 'static) -> Self {
        self.node_postprocessors.push(Box::new(postprocessor));
        self
    }

    /// Retrieval plus postprocessing, without synthesis
    pub async fn retrieve(&self, query: &str) -> Result<Vec<NodeWithScore>> {
        let mut nodes = self.retriever.retrieve(query).await?;
        for postprocessor in &self.node_postprocessors {
            nodes = postprocessor.postprocess_nodes(nodes, query);
        }
        Ok(nodes)
    }

    /// Build the QA prompt for a query and its context nodes
    pub fn build_prompt(&self, query: &str, nodes: &[NodeWithScore]) -> String {
        let context = nodes
            .iter()
            .map(|node| match node.node.metadata.get("file_path").and_then(|p| p.as_str()) {
                Some(path) => format!("file_path: {}\n\n{}", path, node.text()),
                None => node.text().to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        TEXT_QA_TEMPLATE
            .replace("{context_str}", &context)
            .replace("{query_str}", query)
    }
}

#[async_trait]
impl QueryEngine for RetrieverQueryEngine {
    async fn query(&self, query: &str) -> Result<Response> {
        let nodes = self.retrieve(query).await?;

        if nodes.is_empty() {
            tracing::info!("no nodes above the similarity cutoff");
            return Ok(Response::empty(nodes));
        }

        let prompt = self.build_prompt(query, &nodes);
        let result = self.llm.generate(&prompt).await?;

        Ok(Response {
            response: result.text.trim().to_string(),
            metadata: Some(json!({
                "model_id": result.model_id,
                "tokens_used": result.tokens_used,
                "source_count": nodes.len(),
            })),
            source_nodes: nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VectorIndex;
    use crate::indexer::LocalDocumentIndexer;
    use crate::postprocessor::SimilarityPostprocessor;
    use crate::test_support::ScriptedLLM;
    use crate::HashEmbedding;
    use docquery_core::{Document, EMPTY_RESPONSE};

    async fn index() -> Arc<VectorIndex> {
        let documents = vec![
            Document {
                id: "rust.txt".to_string(),
                text: "rust ownership rules prevent data races".to_string(),
                metadata: json!({"file_path": "data/rust.txt"}),
            },
            Document {
                id: "bread.txt".to_string(),
                text: "banana bread recipe with walnuts".to_string(),
                metadata: json!({"file_path": "data/bread.txt"}),
            },
        ];
        let index = VectorIndex::from_documents(
            &documents,
            Arc::new(HashEmbedding::new()),
            &LocalDocumentIndexer::new(),
            Vec::new(),
        )
        .await
        .unwrap();
        Arc::new(index)
    }

    #[tokio::test]
    async fn test_query_synthesizes_from_context() {
        let llm = Arc::new(ScriptedLLM::new("  Ownership prevents data races.\n"));
        let engine = RetrieverQueryEngine::new(VectorIndexRetriever::new(index().await, 4), llm.clone())
            .with_postprocessor(SimilarityPostprocessor::new(0.5));

        let response = engine.query("rust ownership rules prevent data races").await.unwrap();

        assert_eq!(response.response, "Ownership prevents data races.");
        assert_eq!(response.source_nodes.len(), 1);
        assert_eq!(response.source_nodes[0].node.metadata["file_path"], "data/rust.txt");

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("file_path: data/rust.txt\n\nrust ownership rules prevent data races"));
        assert!(prompts[0].contains("Query: rust ownership rules prevent data races\nAnswer: "));
        assert!(!prompts[0].contains("banana"));
    }

    #[tokio::test]
    async fn test_empty_response_skips_llm() {
        let llm = Arc::new(ScriptedLLM::new("unused"));
        let engine = RetrieverQueryEngine::new(VectorIndexRetriever::new(index().await, 4), llm.clone())
            .with_postprocessor(SimilarityPostprocessor::new(1.01));

        let response = engine.query("anything at all").await.unwrap();

        assert_eq!(response.response, EMPTY_RESPONSE);
        assert!(response.source_nodes.is_empty());
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_top_k_limits_sources() {
        let llm = Arc::new(ScriptedLLM::new("ok"));
        let engine = RetrieverQueryEngine::new(VectorIndexRetriever::new(index().await, 1), llm);

        let nodes = engine.retrieve("banana walnuts").await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node.metadata["file_path"], "data/bread.txt");
    }
}
