//! Content blocks.
//!
//! Every ferryman tool answers with text, so text is the only block type
//! modelled. The `type` tag keeps the shape MCP clients expect.

use serde::{Deserialize, Serialize};

/// Content block in a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Text content.
    Text { text: String },
}

impl Content {
    /// Create text content.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    /// The text carried by this block.
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_shape() {
        let json = serde_json::to_value(Content::text("Left bank: [empty].")).unwrap();
        assert_eq!(json, json!({ "type": "text", "text": "Left bank: [empty]." }));
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let parsed: Result<Content, _> =
            serde_json::from_value(json!({ "type": "image", "data": "", "mimeType": "image/png" }));
        assert!(parsed.is_err());
    }
}
