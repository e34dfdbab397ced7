//! Retrieval-augmented chat with persisted memory, and question answering over documents

mod chat;
mod embed;
mod memory;
mod qa;
mod store;

pub use chat::{Persona, RagChat, Retrieved};
pub use embed::{Embedder, OllamaEmbedder, check_dimension, embed_checked};
pub use memory::{ASSISTANT, ChatMemory, USER};
pub use qa::{DocumentQa, build_qa_prompt, chunk_text};
pub use store::{MemoryVectorStore, ScoredMatch, VectorRecord, VectorStore, cosine_similarity};
