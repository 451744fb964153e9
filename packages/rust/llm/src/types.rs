//! Wire types for the Anthropic Messages API (the subset we send and read).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name of the search tool declared to the model.
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A client-declared tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The `web_search` tool: one required string parameter, `query`.
pub fn web_search_tool() -> ToolDefinition {
    ToolDefinition {
        name: WEB_SEARCH_TOOL.into(),
        description: "Search the web for up-to-date information.".into(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                }
            },
            "required": ["query"]
        }),
    }
}

/// Response body. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A typed content block. Only text is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl MessagesResponse {
    /// Join every text block with newlines and trim. No text yields `""`.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> MessagesResponse {
        serde_json::from_value(value).expect("deserialize response")
    }

    #[test]
    fn text_blocks_are_joined_in_order() {
        let response = parse(json!({
            "content": [
                {"type": "text", "text": "  first"},
                {"type": "tool_use", "id": "tu_1", "name": "web_search", "input": {"query": "x"}},
                {"type": "text", "text": "second  "}
            ],
            "stop_reason": "end_turn"
        }));
        assert_eq!(response.text(), "first\nsecond");
    }

    #[test]
    fn no_text_blocks_is_empty() {
        let response = parse(json!({
            "content": [
                {"type": "tool_use", "id": "tu_1", "name": "web_search", "input": {}}
            ],
            "stop_reason": "tool_use"
        }));
        assert_eq!(response.text(), "");
        assert_eq!(
            response.content[0],
            ContentBlock::ToolUse {
                name: "web_search".into()
            }
        );
    }

    #[test]
    fn unknown_block_types_are_tolerated() {
        let response = parse(json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "answer"}
            ]
        }));
        assert_eq!(response.content[0], ContentBlock::Other);
        assert_eq!(response.text(), "answer");
    }

    #[test]
    fn request_omits_optional_fields() {
        let request = MessagesRequest {
            model: "m".into(),
            max_tokens: 10,
            messages: vec![Message::user("hi")],
            system: None,
            tools: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({"model": "m", "max_tokens": 10, "messages": [{"role": "user", "content": "hi"}]})
        );
    }

    #[test]
    fn web_search_tool_requires_query() {
        let tool = serde_json::to_value(web_search_tool()).unwrap();
        assert_eq!(tool["name"], "web_search");
        assert_eq!(tool["input_schema"]["required"], json!(["query"]));
        assert_eq!(tool["input_schema"]["properties"]["query"]["type"], "string");
    }
}
