//! Intent classification - free text to a tool name

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::LlmClient;

/// Resolves free text to the name of one tool.
///
/// The answer is not trusted: callers validate it against the registry.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, candidates: &[String]) -> Result<String>;
}

/// Asks the language model which tool fits the request
pub struct LlmIntentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

/// Prompt sent to the model for classification
pub fn build_intent_prompt(text: &str, candidates: &[String]) -> String {
    format!(
        "Which tool should I use for this request: '{}'? Reply ONLY with the tool name.\nAvailable tools: {}",
        text,
        candidates.join(", ")
    )
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, text: &str, candidates: &[String]) -> Result<String> {
        let reply = self.llm.generate(&build_intent_prompt(text, candidates)).await?;
        log::debug!("Classifier answered '{}' for '{}'", reply.trim(), text);
        Ok(reply.trim().to_string())
    }
}

/// Always answers the same name; counts how often it was asked
#[derive(Debug)]
pub struct StaticClassifier {
    answer: String,
    calls: AtomicUsize,
}

impl StaticClassifier {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentClassifier for StaticClassifier {
    async fn classify(&self, _text: &str, _candidates: &[String]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}
