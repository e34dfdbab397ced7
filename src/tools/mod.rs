//! Tool system
//!
//! Each tool declares its parameter names and turns a complete argument set
//! into text. Tools run inside a [`ToolContext`] that carries the working
//! directory and the backends they may call.

mod ask_llm;
mod context;
mod detect_intent;
mod fetch_url;
mod list_files;
pub(crate) mod pdf;
mod read_file;
mod search;
mod write_file;

pub use ask_llm::{AskLlmTool, NO_RESPONSE};
pub use context::ToolContext;
pub use detect_intent::DetectIntentTool;
pub use fetch_url::FetchUrlTool;
pub use list_files::ListFilesTool;
pub use pdf::{SearchPdfTool, SummarizePdfTool, extract_pdf_text, sanitize_filename};
pub use read_file::ReadFileTool;
pub use search::{DuckDuckGoSearch, SearchHit, WebSearch, parse_ddg_html};
pub use write_file::{ModifyFileTool, WriteFileTool};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::router::{Arguments, IntentClassifier, ToolRegistry, ToolSpec};

/// Name of the prompt-forwarding tool that opens a chat session in the agent
pub const ASK_LLM: &str = "ask_llm";

/// A named operation the router can dispatch to
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registry key
    fn name(&self) -> &'static str;

    /// One line for the help listing
    fn description(&self) -> &'static str;

    /// Parameter names, in the order they are asked for
    fn parameters(&self) -> &'static [&'static str];

    /// Run with every declared parameter present
    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.name(), self.description(), self.parameters())
    }
}

/// Registry with every built-in tool, in help-listing order
pub fn standard_registry(classifier: Arc<dyn IntentClassifier>) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    // File system tools
    registry.register(Box::new(ListFilesTool))?;
    registry.register(Box::new(ReadFileTool))?;
    registry.register(Box::new(WriteFileTool))?;
    registry.register(Box::new(ModifyFileTool))?;

    // Network
    registry.register(Box::new(FetchUrlTool))?;

    // Language model
    registry.register(Box::new(AskLlmTool))?;
    registry.register(Box::new(SearchPdfTool))?;
    registry.register(Box::new(SummarizePdfTool))?;

    let mut candidates = registry.names();
    candidates.push(DetectIntentTool::NAME.to_string());
    registry.register(Box::new(DetectIntentTool::new(classifier, candidates)))?;

    Ok(registry)
}

/// Cut `output` to at most `max_bytes` on a char boundary
pub fn truncate_output(mut output: String, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output;
    }
    let mut end = max_bytes;
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    output.truncate(end);
    output.push_str("\n... [output truncated]");
    output
}
