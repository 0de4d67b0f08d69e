//! Snapshot tests for the OpenAI client

#[cfg(test)]
mod snapshot_tests {
    use crate::{EmbeddingProvider, LLMProvider, OpenAIClient, OpenAIConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot() {
        let config = OpenAIConfig {
            api_key: Some("test_api_key_redacted".to_string()),
            api_base: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
        };

        assert_yaml_snapshot!(config, @r###"
        ---
        api_key: test_api_key_redacted
        api_base: "https://api.openai.com/v1"
        chat_model: gpt-3.5-turbo
        embedding_model: text-embedding-ada-002
        "###);
    }

    #[test]
    fn test_model_ids() {
        let client = OpenAIClient::new(OpenAIConfig::new("test_key"))
            .unwrap()
            .with_model("gpt-4o-mini");

        assert_eq!(LLMProvider::model_id(&client), "gpt-4o-mini");
        assert_eq!(EmbeddingProvider::model_id(&client), "text-embedding-ada-002");
    }
}
