//! Retrieval-augmented chat turn
//!
//! Every user message is embedded and kept in the vector store as `msg-<i>`.
//! A turn pulls two kinds of context before calling the model: the closest
//! earlier user message (when it clears the similarity threshold) and the
//! store's top matches. The reply is streamed to the caller fragment by
//! fragment and then written back to the persisted memory.

use std::sync::Arc;

use log::{debug, info};
use serde_json::json;

use super::embed::{Embedder, embed_checked};
use super::memory::{ASSISTANT, ChatMemory, USER};
use super::store::{VectorRecord, VectorStore, cosine_similarity};
use crate::config::RagConfig;
use crate::error::Result;
use crate::llm::{ChatMessage, LlmClient, StreamChunk, create_stream_channel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub tone: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tone: tone.into(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are a helpful assistant talking to {} in a {} tone.",
            self.name, self.tone
        )
    }
}

/// Context gathered for one turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieved {
    pub local: Option<String>,
    pub external: Option<String>,
}

pub struct RagChat {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    memory: ChatMemory,
    persona: Persona,
    top_k: usize,
    threshold: f32,
    /// Embeddings of memory entries by index; only user entries are filled
    vectors: Vec<Option<Vec<f32>>>,
}

impl RagChat {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        memory: ChatMemory,
        persona: Persona,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            memory,
            persona,
            top_k: 3,
            threshold: 0.6,
            vectors: Vec::new(),
        }
    }

    /// Retrieval settings from configuration
    pub fn with_config(mut self, config: &RagConfig) -> Self {
        self.top_k = config.top_k;
        self.threshold = config.similarity_threshold;
        self
    }

    pub fn memory(&self) -> &ChatMemory {
        &self.memory
    }

    /// Embed user messages not seen yet and upsert them all
    async fn index_user_messages(&mut self) -> Result<()> {
        self.vectors.resize(self.memory.len(), None);

        let mut records = Vec::new();
        for (i, text) in self.memory.user_messages() {
            if self.vectors[i].is_none() {
                self.vectors[i] = Some(embed_checked(self.embedder.as_ref(), text).await?);
            }
            if let Some(values) = &self.vectors[i] {
                records.push(VectorRecord {
                    id: format!("msg-{}", i),
                    values: values.clone(),
                    metadata: json!({ "text": text }),
                });
            }
        }

        debug!("Upserting {} user messages", records.len());
        self.store.upsert(records).await
    }

    /// Closest earlier user message to the one at `current`, if above threshold
    fn local_context(&self, current: usize, query: &[f32]) -> Option<String> {
        let (score, text) = self
            .memory
            .user_messages()
            .filter(|(i, _)| *i != current)
            .filter_map(|(i, text)| {
                let values = self.vectors.get(i)?.as_ref()?;
                Some((cosine_similarity(query, values), text))
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))?;

        debug!("Best local match scored {:.3}", score);
        (score > self.threshold).then(|| text.to_string())
    }

    async fn retrieve(&self, current: usize, query: &[f32]) -> Result<Retrieved> {
        let local = self.local_context(current, query);

        let matches = self.store.query(query, self.top_k).await?;
        let texts: Vec<&str> = matches.iter().filter_map(|m| m.text()).collect();
        let external = (!texts.is_empty()).then(|| texts.join("\n"));

        Ok(Retrieved { local, external })
    }

    /// Messages for the chat endpoint: persona, context, then the whole memory
    pub fn build_messages(&self, retrieved: &Retrieved) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.persona.system_prompt())];
        if let Some(ctx) = &retrieved.local {
            messages.push(ChatMessage::system(format!("Relevant user context: \"{}\"", ctx)));
        }
        if let Some(ctx) = &retrieved.external {
            messages.push(ChatMessage::system(format!("External knowledge: \"{}\"", ctx)));
        }
        messages.extend(self.memory.to_messages());
        messages
    }

    /// One exchange. `render` sees each reply fragment once, in order.
    pub async fn turn<F: FnMut(&str)>(&mut self, prompt: &str, mut render: F) -> Result<String> {
        self.memory.push(USER, prompt);
        let current = self.memory.len() - 1;

        self.index_user_messages().await?;
        let query = self.vectors[current].clone().unwrap_or_default();
        let retrieved = self.retrieve(current, &query).await?;
        let messages = self.build_messages(&retrieved);
        info!("RAG turn with {} messages", messages.len());

        let (tx, mut handle) = create_stream_channel(64);
        let llm = Arc::clone(&self.llm);
        let (reply, ()) = tokio::join!(llm.stream_chat(&messages, tx), async {
            while let Some(chunk) = handle.recv().await {
                match chunk {
                    StreamChunk::Text(text) => render(&text),
                    StreamChunk::Done | StreamChunk::Error(_) => break,
                }
            }
        });
        let reply = reply?;

        self.memory.push(ASSISTANT, reply.clone());
        self.memory.save()?;
        Ok(reply)
    }
}
