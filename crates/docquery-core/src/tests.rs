//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{
        Error, GenerationConfig, IndexingConfig, NodeWithScore, Response, SearchConfig,
        VectorDocument, EMPTY_RESPONSE,
    };
    use insta::assert_yaml_snapshot;
    use serde_json::json;

    #[test]
    fn test_default_configs_snapshot() {
        assert_yaml_snapshot!(IndexingConfig::default(), @r###"
        ---
        chunk_size: 1000
        batch_size: 10
        "###);

        assert_yaml_snapshot!(SearchConfig::default(), @r###"
        ---
        top_k: 4
        score_threshold: ~
        "###);
    }

    #[test]
    fn test_generation_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.model_id, "gpt-3.5-turbo");
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, None);
    }

    #[test]
    fn test_response_display_is_answer_text() {
        let node = VectorDocument {
            id: "n1".to_string(),
            content: "The sky is blue.".to_string(),
            embedding: None,
            metadata: json!({}),
            score: None,
        };
        let response = Response {
            response: "Blue.".to_string(),
            source_nodes: vec![NodeWithScore::new(node, Some(0.9))],
            metadata: None,
        };

        assert_eq!(response.to_string(), "Blue.");
        assert_eq!(response.source_nodes[0].id(), "n1");
        assert_eq!(response.source_nodes[0].text(), "The sky is blue.");
    }

    #[test]
    fn test_empty_response() {
        let response = Response::empty(Vec::new());
        assert_eq!(response.response, EMPTY_RESPONSE);
        assert!(response.source_nodes.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::DocumentIndexer("No files found in data".to_string());
        assert_eq!(err.to_string(), "Document indexer error: No files found in data");

        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
