//! Toolrouter - route typed commands and free-text intents to local tools
//!
//! A [`router::ToolRouter`] resolves a request to a registered tool, either
//! by exact name or through an LLM-backed intent classifier, collects the
//! tool's declared parameters and runs it. The same model backs the `ask_llm`
//! chat session and the retrieval-augmented chat in [`rag`].

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod rag;
pub mod router;
pub mod session;
pub mod tools;

pub use error::{Result, RouterError};
