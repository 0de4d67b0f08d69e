//! Query engine trait and response types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Result, VectorDocument};

/// Response text used when no source node survives retrieval and filtering
pub const EMPTY_RESPONSE: &str = "Empty Response";

/// A retrieved node together with its similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeWithScore {
    pub node: VectorDocument,
    pub score: Option<f32>,
}

impl NodeWithScore {
    pub fn new(node: VectorDocument, score: Option<f32>) -> Self {
        Self { node, score }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn text(&self) -> &str {
        &self.node.content
    }
}

/// Answer to a query, with the nodes it was synthesized from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub response: String,
    pub source_nodes: Vec<NodeWithScore>,
    pub metadata: Option<serde_json::Value>,
}

impl Response {
    pub fn empty(source_nodes: Vec<NodeWithScore>) -> Self {
        Self {
            response: EMPTY_RESPONSE.to_string(),
            source_nodes,
            metadata: None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response)
    }
}

/// Trait for query engines
///
/// A query engine combines retrieval and response synthesis into a single call. The
/// query string is passed through verbatim.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, query: &str) -> Result<Response>;
}
