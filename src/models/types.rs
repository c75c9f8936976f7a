//! Request/response types for the Ollama API.

use serde::{Deserialize, Serialize};

/// Normalized model output.
///
/// The two Ollama completion endpoints return different shapes: `/api/generate`
/// yields plain text, `/api/chat` wraps it in a message object. The client
/// returns this union and callers normalize exactly once via
/// [`ModelOutput::into_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// Bare completion text from /api/generate
    PlainText(String),
    /// Message-wrapped completion from /api/chat
    Message { content: String },
}

impl ModelOutput {
    /// Extract the textual content regardless of variant
    pub fn into_text(self) -> String {
        match self {
            ModelOutput::PlainText(text) => text,
            ModelOutput::Message { content } => content,
        }
    }
}

/// Request body for POST /api/generate
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

/// Request body for POST /api/chat
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

/// Sampling options forwarded to the model
#[derive(Debug, Clone, Serialize)]
pub struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Response body from POST /api/generate
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Response body from POST /api/chat
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// Request body for POST /api/embeddings
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub prompt: String,
}

/// Response body from POST /api/embeddings
#[derive(Debug, Deserialize)]
pub struct EmbeddingsResponse {
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_text_plain() {
        let output = ModelOutput::PlainText("hello".to_string());
        assert_eq!(output.into_text(), "hello");
    }

    #[test]
    fn test_into_text_message() {
        let output = ModelOutput::Message {
            content: "hello".to_string(),
        };
        assert_eq!(output.into_text(), "hello");
    }

    #[test]
    fn test_generate_request_skips_absent_options() {
        let request = GenerateRequest {
            model: "gemma3:1b".to_string(),
            prompt: "hi".to_string(),
            stream: false,
            options: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("options"));
    }

    #[test]
    fn test_generate_request_serializes_temperature() {
        let request = GenerateRequest {
            model: "gemma3:1b".to_string(),
            prompt: "hi".to_string(),
            stream: false,
            options: Some(ModelOptions {
                temperature: Some(0.2),
            }),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("temperature"));
    }
}
