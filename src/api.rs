//! OpenAI-compatible API types
//!
//! Covers the request body sent to `/v1/chat/completions` plus both response
//! shapes: the full (non-streamed) completion object and the incremental
//! chunk objects carried in `data:` lines of a `text/event-stream` response.
//! Response types tolerate missing fields so that a chunk carrying only a
//! delta, only a full message, or only an error still deserializes.

use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,

    /// Request an incremental `text/event-stream` response
    pub stream: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Chat completion response (non-streamed)
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Content of the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,

    pub message: AssistantMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

/// One event payload of a streamed chat completion
///
/// Streaming servers send `choices[].delta`; some proxies answer the same
/// request with full `choices[].message` objects instead, and errors arrive
/// as a top-level `error` object. All three are optional here and resolved
/// by [`ChatChunk::content`] and [`ChatChunk::error_message`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,

    #[serde(default)]
    pub error: Option<ApiError>,
}

impl ChatChunk {
    /// Incremental content of the first choice
    ///
    /// The delta field takes precedence; a full message object is used as
    /// fallback when no delta content is present.
    pub fn content(&self) -> Option<&str> {
        let choice = self.choices.first()?;
        if let Some(content) = choice.delta.as_ref().and_then(|d| d.content.as_deref()) {
            return Some(content);
        }
        choice.message.as_ref()?.content.as_deref()
    }

    /// Upstream error message, if the payload carries one
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Option<MessageDelta>,

    #[serde(default)]
    pub message: Option<AssistantMessage>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelta {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest::new(
            "gpt-oss-120b",
            vec![
                ChatMessage::system("Answer briefly."),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
            ],
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-oss-120b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["messages"][2]["role"], "assistant");
        // Unset optionals must not appear in the body
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_chunk_delta_content() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#).unwrap();
        assert_eq!(chunk.content(), Some("Hel"));
        assert_eq!(chunk.error_message(), None);
    }

    #[test]
    fn test_chunk_message_fallback() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"full"}}]}"#)
                .unwrap();
        assert_eq!(chunk.content(), Some("full"));
    }

    #[test]
    fn test_chunk_delta_takes_precedence() {
        let chunk: ChatChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"content":"delta"},"message":{"content":"message"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.content(), Some("delta"));
    }

    #[test]
    fn test_chunk_error_payload() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"error":{"message":"model overloaded"}}"#).unwrap();
        assert_eq!(chunk.content(), None);
        assert_eq!(chunk.error_message(), Some("model overloaded"));
    }

    #[test]
    fn test_chunk_tolerates_sparse_fields() {
        let chunk: ChatChunk = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(chunk.content(), None);
        assert_eq!(chunk.error_message(), None);

        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"finish_reason":"stop"}],"unknown":1}"#).unwrap();
        assert_eq!(chunk.content(), None);
    }

    #[test]
    fn test_response_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"cmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"hi"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(response.content(), Some("hi"));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.content(), None);
    }
}
