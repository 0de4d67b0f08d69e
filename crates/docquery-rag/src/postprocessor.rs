//! Node postprocessors applied between retrieval and synthesis

use docquery_core::NodeWithScore;

pub const DEFAULT_SIMILARITY_CUTOFF: f32 = 0.80;

/// Transforms the list of retrieved nodes before synthesis
pub trait NodePostprocessor: Send + Sync {
    fn postprocess_nodes(&self, nodes: Vec<NodeWithScore>, query: &str) -> Vec<NodeWithScore>;
}

/// Drops nodes scoring below a fixed similarity cutoff
#[derive(Debug, Clone, Copy)]
pub struct SimilarityPostprocessor {
    similarity_cutoff: f32,
}

impl SimilarityPostprocessor {
    pub fn new(similarity_cutoff: f32) -> Self {
        Self { similarity_cutoff }
    }

    pub fn similarity_cutoff(&self) -> f32 {
        self.similarity_cutoff
    }
}

impl Default for SimilarityPostprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_CUTOFF)
    }
}

impl NodePostprocessor for SimilarityPostprocessor {
    fn postprocess_nodes(&self, nodes: Vec<NodeWithScore>, _query: &str) -> Vec<NodeWithScore> {
        let before = nodes.len();
        let kept: Vec<NodeWithScore> = nodes
            .into_iter()
            .filter(|node| node.score.is_some_and(|score| score >= self.similarity_cutoff))
            .collect();

        tracing::debug!(
            cutoff = self.similarity_cutoff,
            before,
            after = kept.len(),
            "applied similarity cutoff"
        );
        kept
    }
}
