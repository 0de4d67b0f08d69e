//! Snapshot tests for RAG components

#[cfg(test)]
mod snapshot_tests {
    use crate::{
        format_response, IndexOptions, NodeWithScore, Response, StalenessPolicy, VectorDocument,
    };
    use insta::{assert_snapshot, assert_yaml_snapshot};
    use serde_json::json;

    fn node(id: &str, text: &str, score: f32) -> NodeWithScore {
        NodeWithScore::new(
            VectorDocument {
                id: id.to_string(),
                content: text.to_string(),
                embedding: None,
                metadata: json!({"file_name": "guide.txt"}),
                score: Some(score),
            },
            Some(score),
        )
    }

    #[test]
    fn test_format_response_with_sources_snapshot() {
        let response = Response {
            response: "The index is rebuilt only when the storage directory is missing.".to_string(),
            source_nodes: vec![
                node("3f2a-0", "When the storage directory does not exist, documents are read and indexed.", 0.91),
                node("3f2a-1", "Otherwise the persisted index is loaded.", 0.85),
            ],
            metadata: None,
        };

        assert_snapshot!(format_response(&response, true), @r###"
        Final Response: The index is rebuilt only when the storage directory
        is missing.
        ______________________________________________________________________
        Source Node 1/2
        Node ID: 3f2a-0
        Similarity: 0.91
        Text: When the storage directory does not exist, documents are read
        and indexed.
        ______________________________________________________________________
        Source Node 2/2
        Node ID: 3f2a-1
        Similarity: 0.85
        Text: Otherwise the persisted index is loaded.
        "###);
    }

    #[test]
    fn test_staleness_policy_serialization() {
        assert_yaml_snapshot!(
            vec![StalenessPolicy::Trust, StalenessPolicy::Verify, StalenessPolicy::Rebuild],
            @r###"
        ---
        - trust
        - verify
        - rebuild
        "###
        );
    }

    #[test]
    fn test_default_index_options() {
        let options = IndexOptions::default();
        assert_eq!(options.data_dir.to_str(), Some("data"));
        assert_eq!(options.policy, StalenessPolicy::Trust);
        assert!(!options.recursive);
    }
}
