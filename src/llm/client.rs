//! Core LLM client trait and a scripted mock for tests

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::streaming::StreamChunk;
use super::types::ChatMessage;
use crate::error::{Result, RouterError};

/// Stateless LLM client - each call carries its full context
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-prompt completion, blocking until the whole reply is in
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Chat completion over a message list, non-streaming
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Chat completion that forwards fragments as they arrive and returns the full text
    async fn stream_chat(&self, messages: &[ChatMessage], chunk_tx: mpsc::Sender<StreamChunk>) -> Result<String>;

    /// Model name used for generate calls
    fn model(&self) -> &str;
}

/// Replays scripted replies and records every request it sees
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    chats: Mutex<Vec<Vec<ChatMessage>>>,
    unavailable: bool,
}

impl MockLlmClient {
    pub fn new(replies: Vec<impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// A client whose backend can never be reached
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    /// Prompts passed to `generate`, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Message lists passed to `chat` and `stream_chat`, in call order
    pub fn chats(&self) -> Vec<Vec<ChatMessage>> {
        self.chats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn next_reply(&self) -> Result<String> {
        if self.unavailable {
            return Err(RouterError::BackendUnavailable("connection refused".to_string()));
        }
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| RouterError::InvalidResponse("no scripted reply left".to_string()))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.next_reply()
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.chats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());
        self.next_reply()
    }

    async fn stream_chat(&self, messages: &[ChatMessage], chunk_tx: mpsc::Sender<StreamChunk>) -> Result<String> {
        let reply = self.chat(messages).await?;
        for word in reply.split_inclusive(' ') {
            let _ = chunk_tx.send(StreamChunk::Text(word.to_string())).await;
        }
        let _ = chunk_tx.send(StreamChunk::Done).await;
        Ok(reply)
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
