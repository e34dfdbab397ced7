//! Text embeddings

use async_trait::async_trait;

use crate::error::{Result, RouterError};
use crate::llm::OllamaClient;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;
}

/// Embeddings from the local Ollama server
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embeddings(&self.model, text).await?;
        check_dimension(vector, self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embed `text` and hold the result to the embedder's declared dimension
pub async fn embed_checked(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    let vector = embedder.embed(text).await?;
    check_dimension(vector, embedder.dimension())
}

/// Reject vectors a store built for `expected` dimensions could not hold
pub fn check_dimension(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>> {
    if vector.len() != expected {
        return Err(RouterError::InvalidResponse(format!(
            "embedding has {} dimensions, expected {}",
            vector.len(),
            expected
        )));
    }
    Ok(vector)
}
