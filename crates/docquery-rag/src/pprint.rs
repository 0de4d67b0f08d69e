//! Plain-text rendering of responses and their sources

use docquery_core::{NodeWithScore, Response};

const SOURCE_LENGTH: usize = 350;
const WRAP_WIDTH: usize = 70;

/// Render a response, optionally followed by every source node
pub fn format_response(response: &Response, show_source: bool) -> String {
    let mut out = String::new();
    let text = if response.response.is_empty() {
        "None"
    } else {
        response.response.as_str()
    };
    out.push_str(&fill(&format!("Final Response: {}", text), WRAP_WIDTH));
    out.push('\n');

    if show_source {
        let total = response.source_nodes.len();
        for (i, node) in response.source_nodes.iter().enumerate() {
            out.push_str(&format!("{}\nSource Node {}/{}\n", "_".repeat(WRAP_WIDTH), i + 1, total));
            out.push_str(&format_source_node(node));
        }
    }

    out
}

/// Render one source node: id, similarity and truncated text
pub fn format_source_node(node: &NodeWithScore) -> String {
    let similarity = match node.score {
        Some(score) => score.to_string(),
        None => "None".to_string(),
    };
    let text = truncate(node.text().trim(), SOURCE_LENGTH);
    format!(
        "Node ID: {}\nSimilarity: {}\n{}\n",
        node.id(),
        similarity,
        fill(&format!("Text: {}", text), WRAP_WIDTH)
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Greedy word wrap; whitespace runs collapse to single spaces
fn fill(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docquery_core::VectorDocument;
    use serde_json::json;

    fn node(id: &str, text: &str, score: Option<f32>) -> NodeWithScore {
        NodeWithScore::new(
            VectorDocument {
                id: id.to_string(),
                content: text.to_string(),
                embedding: None,
                metadata: json!({}),
                score,
            },
            score,
        )
    }

    #[test]
    fn test_fill_wraps_at_width() {
        let wrapped = fill("aaa bbb ccc ddd", 7);
        assert_eq!(wrapped, "aaa bbb\nccc ddd");
        assert_eq!(fill("  spaced \n  out  ", 70), "spaced out");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 10), "abcdefg...");
    }

    #[test]
    fn test_response_without_sources() {
        let response = Response {
            response: "Rust is memory safe.".to_string(),
            source_nodes: vec![node("n1", "text", Some(0.9))],
            metadata: None,
        };
        assert_eq!(format_response(&response, false), "Final Response: Rust is memory safe.\n");
    }

    #[test]
    fn test_long_source_text_is_truncated() {
        let response = Response {
            response: "ok".to_string(),
            source_nodes: vec![node("n1", &"word ".repeat(200), Some(0.5))],
            metadata: None,
        };
        let rendered = format_response(&response, true);
        assert!(rendered.contains("Source Node 1/1"));
        assert!(rendered.trim_end().ends_with("..."));
        assert!(rendered.lines().all(|l| l.chars().count() <= WRAP_WIDTH));
    }

    #[test]
    fn test_source_node_without_score() {
        assert_eq!(
            format_source_node(&node("n2", "  some text  ", None)),
            "Node ID: n2\nSimilarity: None\nText: some text\n"
        );
    }
}
