//! detect_intent tool - Ask the classifier which tool fits a request

use std::sync::Arc;

use async_trait::async_trait;

use super::{Tool, ToolContext};
use crate::router::{Arguments, IntentClassifier};

pub struct DetectIntentTool {
    classifier: Arc<dyn IntentClassifier>,
    candidates: Vec<String>,
}

impl DetectIntentTool {
    pub const NAME: &'static str = "detect_intent";

    pub fn new(classifier: Arc<dyn IntentClassifier>, candidates: Vec<String>) -> Self {
        Self { classifier, candidates }
    }
}

#[async_trait]
impl Tool for DetectIntentTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Determine the appropriate tool for a free-form task"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["prompt"]
    }

    async fn execute(&self, args: &Arguments, _ctx: &ToolContext) -> eyre::Result<String> {
        let prompt = args.require(self.name(), "prompt")?;
        let tool = self.classifier.classify(prompt, &self.candidates).await?;
        Ok(tool.trim().to_string())
    }
}
