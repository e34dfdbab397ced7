//! ask_llm tool - Forward a prompt to the local model

use async_trait::async_trait;

use super::{ASK_LLM, Tool, ToolContext};
use crate::router::Arguments;

/// Reply used when the backend answers without any text
pub const NO_RESPONSE: &str = "No response from model.";

pub struct AskLlmTool;

#[async_trait]
impl Tool for AskLlmTool {
    fn name(&self) -> &'static str {
        ASK_LLM
    }

    fn description(&self) -> &'static str {
        "Ask a prompt to your local Ollama LLM"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["prompt"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let prompt = args.require(self.name(), "prompt")?;
        let reply = ctx.llm.generate(prompt).await?;

        let reply = reply.trim();
        if reply.is_empty() {
            Ok(NO_RESPONSE.to_string())
        } else {
            Ok(reply.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use crate::llm::MockLlmClient;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_forwards_prompt() {
        let dir = tempdir().unwrap();
        let mock = Arc::new(MockLlmClient::new(vec!["  Paris.\n"]));
        let ctx = ToolContext::new(dir.path().to_path_buf(), mock.clone());

        let reply = AskLlmTool
            .execute(&Arguments::new().with("prompt", "Capital of France?"), &ctx)
            .await
            .unwrap();

        assert_eq!(reply, "Paris.");
        assert_eq!(mock.prompts(), vec!["Capital of France?"]);
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let dir = tempdir().unwrap();
        let ctx = ToolContext::new(dir.path().to_path_buf(), Arc::new(MockLlmClient::new(vec![""])));

        let reply = AskLlmTool
            .execute(&Arguments::new().with("prompt", "hello"), &ctx)
            .await
            .unwrap();

        assert_eq!(reply, NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_backend_down() {
        let dir = tempdir().unwrap();
        let ctx = ToolContext::new(dir.path().to_path_buf(), Arc::new(MockLlmClient::unavailable()));

        let err = AskLlmTool
            .execute(&Arguments::new().with("prompt", "hello"), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RouterError>(),
            Some(RouterError::BackendUnavailable(_))
        ));
    }
}
