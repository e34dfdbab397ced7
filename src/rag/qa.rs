//! Question answering over local documents
//!
//! Files are split into overlapping character windows, embedded and kept in
//! the vector store as `doc-<source>-<i>`. A question pulls the closest
//! chunks and asks the model to answer from them alone.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde_json::json;

use super::embed::{Embedder, embed_checked};
use super::store::{VectorRecord, VectorStore};
use crate::config::RagConfig;
use crate::error::{Result, RouterError};
use crate::llm::LlmClient;
use crate::tools::extract_pdf_text;

/// Windows of `size` characters, each starting `size - overlap` after the previous.
/// Blank windows are dropped.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let step = if overlap < size { size - overlap } else { size };
    let chars: Vec<char> = text.chars().collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

pub fn build_qa_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an intelligent assistant. Use the context provided below to answer the question.\n\
         If the context does not contain the answer, say \"I don't know.\"\n\n\
         Context:\n{}\n\nQuestion: {}\n\nAnswer:",
        context, question
    )
}

pub struct DocumentQa {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    chunk_size: usize,
    chunk_overlap: usize,
    chunks: usize,
}

impl DocumentQa {
    pub fn new(llm: Arc<dyn LlmClient>, embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            llm,
            embedder,
            store,
            top_k: 1,
            chunk_size: 1000,
            chunk_overlap: 200,
            chunks: 0,
        }
    }

    pub fn with_config(mut self, config: &RagConfig) -> Self {
        self.top_k = config.qa_top_k;
        self.chunk_size = config.chunk_size;
        self.chunk_overlap = config.chunk_overlap;
        self
    }

    /// Chunks ingested so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Split `text`, embed every chunk and store it under `source`
    pub async fn ingest_text(&mut self, source: &str, text: &str) -> Result<usize> {
        let chunks = chunk_text(text, self.chunk_size, self.chunk_overlap);

        let mut records = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            records.push(VectorRecord {
                id: format!("doc-{}-{}", source, i),
                values: embed_checked(self.embedder.as_ref(), chunk).await?,
                metadata: json!({ "text": chunk, "source": source }),
            });
        }

        let count = records.len();
        self.store.upsert(records).await?;
        self.chunks += count;
        info!("Ingested {} chunks from {}", count, source);
        Ok(count)
    }

    /// Ingest a PDF (by extension) or a UTF-8 text file
    pub async fn ingest_file(&mut self, path: &Path) -> Result<usize> {
        let source = path.display().to_string();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let text = if is_pdf {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| RouterError::file(source.as_str(), e))?;
            extract_pdf_text(bytes, None).await?
        } else {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| RouterError::file(source.as_str(), e))?
        };

        self.ingest_text(&source, &text).await
    }

    /// Answer from the closest chunks; `NotFound` when nothing was ingested
    pub async fn answer(&self, question: &str) -> Result<String> {
        let query = embed_checked(self.embedder.as_ref(), question).await?;
        let matches = self.store.query(&query, self.top_k).await?;
        let texts: Vec<&str> = matches.iter().filter_map(|m| m.text()).collect();
        if texts.is_empty() {
            return Err(RouterError::NotFound("no document context; ingest a file first".to_string()));
        }

        debug!("Answering from {} chunks, best score {:.3}", texts.len(), matches[0].score);
        let reply = self.llm.generate(&build_qa_prompt(&texts.join("\n\n"), question)).await?;
        Ok(reply.trim().to_string())
    }
}
