//! Dispatcher - resolve, collect arguments, invoke, wrap the outcome

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use log::{debug, error, info, warn};

use super::{Arguments, IntentClassifier, InvocationRequest, InvocationResult, ToolRegistry, ToolSpec};
use crate::error::{Result, RouterError, panic_message};
use crate::tools::ToolContext;

/// Supplies values for parameters the request did not carry
pub trait ArgumentSource {
    fn acquire(&mut self, tool: &str, param: &str) -> Result<String>;
}

/// For contexts with nobody to ask: every missing parameter is an error
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl ArgumentSource for NonInteractive {
    fn acquire(&mut self, tool: &str, param: &str) -> Result<String> {
        Err(RouterError::MissingArgument {
            tool: tool.to_string(),
            param: param.to_string(),
        })
    }
}

/// Registry, classifier and tool context, built once at startup
pub struct ToolRouter {
    registry: ToolRegistry,
    classifier: Arc<dyn IntentClassifier>,
    ctx: ToolContext,
}

impl ToolRouter {
    pub fn new(registry: ToolRegistry, classifier: Arc<dyn IntentClassifier>, ctx: ToolContext) -> Self {
        Self {
            registry,
            classifier,
            ctx,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Exact registry key, or whatever the classifier maps the text to
    pub async fn resolve(&self, input: &str) -> Result<&ToolSpec> {
        if let Ok(spec) = self.registry.lookup(input) {
            return Ok(spec);
        }

        let unknown = || RouterError::Classification {
            input: input.to_string(),
        };

        let candidate = match self.classifier.classify(input, &self.registry.names()).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Intent classification failed for '{}': {}", input, e);
                return Err(unknown());
            }
        };

        debug!("Classified '{}' as '{}'", input, candidate);
        self.registry.lookup(candidate.trim()).map_err(|_| unknown())
    }

    /// Complete argument set for `spec`, asking `source` for anything missing
    pub fn collect_arguments(
        &self,
        spec: &ToolSpec,
        provided: Arguments,
        source: &mut dyn ArgumentSource,
    ) -> Result<Arguments> {
        if let Some(extra) = provided.names().find(|name| !spec.declares(name)) {
            return Err(RouterError::UnexpectedArgument {
                tool: spec.name.clone(),
                param: extra.to_string(),
            });
        }

        let mut arguments = provided;
        for param in &spec.parameters {
            if !arguments.contains(param) {
                let value = source.acquire(&spec.name, param)?;
                arguments.insert(param.clone(), value);
            }
        }
        Ok(arguments)
    }

    /// Run the handler of a registered tool with a complete argument set
    pub async fn invoke(&self, name: &str, arguments: &Arguments) -> InvocationResult {
        let tool = match self.registry.handler(name) {
            Ok(tool) => tool,
            Err(e) => return InvocationResult::Failure(e),
        };

        info!("Invoking tool '{}'", name);
        match AssertUnwindSafe(tool.execute(arguments, &self.ctx)).catch_unwind().await {
            Ok(Ok(text)) => InvocationResult::Success(text),
            Ok(Err(report)) => {
                warn!("Tool '{}' failed: {:#}", name, report);
                InvocationResult::Failure(into_router_error(report))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Tool '{}' panicked: {}", name, message);
                InvocationResult::Failure(RouterError::Tool(format!("tool '{}' panicked: {}", name, message)))
            }
        }
    }

    pub async fn dispatch(&self, request: InvocationRequest, source: &mut dyn ArgumentSource) -> InvocationResult {
        let spec = match self.resolve(&request.tool_name).await {
            Ok(spec) => spec,
            Err(e) => return InvocationResult::Failure(e),
        };

        let arguments = match self.collect_arguments(spec, request.arguments, source) {
            Ok(arguments) => arguments,
            Err(e) => return InvocationResult::Failure(e),
        };

        self.invoke(&spec.name, &arguments).await
    }
}

/// Keep the typed error when the handler raised one, otherwise keep the message
fn into_router_error(report: eyre::Report) -> RouterError {
    match report.downcast::<RouterError>() {
        Ok(err) => err,
        Err(report) => RouterError::Tool(format!("{:#}", report)),
    }
}
