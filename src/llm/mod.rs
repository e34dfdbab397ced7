//! LLM Client Layer - local Ollama backend with streaming support
//!
//! This module provides:
//! - Message and wire types for the generate/chat endpoints
//! - LlmClient trait for backend abstraction
//! - OllamaClient implementation
//! - NDJSON streaming support

pub mod client;
pub mod ollama;
pub mod streaming;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use ollama::{OllamaClient, OllamaConfig};
pub use streaming::{NdjsonDecoder, StreamChunk, StreamHandle, StreamParser, create_stream_channel, parse_frame};
pub use types::{ChatMessage, ChatRequest, EmbeddingRequest, EmbeddingResponse, GenerateRequest, ResponseFrame, Role};
