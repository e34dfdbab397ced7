//! Wire types for the local language-model backend
//!
//! The backend speaks the Ollama HTTP API: `/api/generate` takes a single
//! prompt, `/api/chat` takes a message list. Both answer either with one JSON
//! object or, when streaming, with newline-delimited JSON frames.

use serde::{Deserialize, Serialize};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message for the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Body for `/api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

/// Body for `/api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// One response object, or one line of a streamed response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseFrame {
    /// Text from `/api/generate`
    #[serde(default)]
    pub response: Option<String>,

    /// Message from `/api/chat`
    #[serde(default)]
    pub message: Option<FrameMessage>,

    /// Set on the final frame of a stream
    #[serde(default)]
    pub done: bool,

    /// Backend-reported failure
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameMessage {
    #[serde(default)]
    pub content: String,
}

impl ResponseFrame {
    /// Text carried by this frame, whichever endpoint produced it
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .or_else(|| self.message.as_ref().map(|m| m.content.as_str()))
    }
}

/// Body for `/api/embeddings`
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub embedding: Vec<f32>,
}
