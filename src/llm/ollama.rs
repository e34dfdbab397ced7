//! Ollama API client implementation
//!
//! Implements LlmClient against a locally hosted Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use reqwest::{Client, Response};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::LlmConfig;
use crate::error::{Result, RouterError};
use crate::llm::client::LlmClient;
use crate::llm::streaming::{NdjsonDecoder, StreamChunk, StreamParser, parse_frame};
use crate::llm::types::{ChatMessage, ChatRequest, EmbeddingRequest, EmbeddingResponse, GenerateRequest, ResponseFrame};

/// Configuration for the Ollama client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub endpoint: String,
    pub model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for OllamaConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            chat_model: config.chat_model.clone(),
            timeout: config.timeout(),
        }
    }
}

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RouterError::BackendUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Join the base endpoint and an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RouterError::BackendUnavailable(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RouterError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(response)
    }

    async fn post_once<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ResponseFrame> {
        let frame: ResponseFrame = self
            .post(path, body)
            .await?
            .json()
            .await
            .map_err(|e| RouterError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(message) = &frame.error {
            return Err(RouterError::Api {
                status: 200,
                message: message.clone(),
            });
        }
        Ok(frame)
    }

    /// Embedding vector for `prompt` from `/api/embeddings`
    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
        };

        let response: EmbeddingResponse = self
            .post("/api/embeddings", &request)
            .await?
            .json()
            .await
            .map_err(|e| RouterError::InvalidResponse(format!("Failed to parse embedding: {}", e)))?;

        Ok(response.embedding)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };
        info!("Sending generate request to {} ({} chars)", self.config.model, prompt.len());

        let frame = self.post_once("/api/generate", &request).await?;
        Ok(frame.text().unwrap_or_default().to_string())
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: messages.to_vec(),
            stream: false,
        };
        info!("Sending chat request to {} ({} messages)", self.config.chat_model, messages.len());

        let frame = self.post_once("/api/chat", &request).await?;
        Ok(frame.text().unwrap_or_default().to_string())
    }

    async fn stream_chat(&self, messages: &[ChatMessage], chunk_tx: mpsc::Sender<StreamChunk>) -> Result<String> {
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: messages.to_vec(),
            stream: true,
        };
        info!(
            "Sending streaming chat request to {} ({} messages)",
            self.config.chat_model,
            messages.len()
        );

        let response = self.post("/api/chat", &request).await?;
        let mut body = response.bytes_stream();
        let mut decoder = NdjsonDecoder::new();
        let mut parser = StreamParser::new();

        while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(|e| RouterError::BackendUnavailable(format!("Stream interrupted: {}", e)))?;
            for line in decoder.push(&bytes) {
                forward(&mut parser, &line, &chunk_tx).await?;
            }
        }
        if let Some(line) = decoder.finish() {
            forward(&mut parser, &line, &chunk_tx).await?;
        }

        if !parser.finished {
            let _ = chunk_tx.send(StreamChunk::Done).await;
        }
        Ok(parser.text_content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

async fn forward(parser: &mut StreamParser, line: &str, chunk_tx: &mpsc::Sender<StreamChunk>) -> Result<()> {
    for chunk in parser.process_frame(parse_frame(line)?) {
        let failure = match &chunk {
            StreamChunk::Error(message) => Some(message.clone()),
            _ => None,
        };
        // Receiver may have gone away; the full text is still returned.
        let _ = chunk_tx.send(chunk).await;
        if let Some(message) = failure {
            return Err(RouterError::Api { status: 200, message });
        }
    }
    Ok(())
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .field("chat_model", &self.config.chat_model)
            .finish()
    }
}
