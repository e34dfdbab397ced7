//! Tool routing - registry, intent classification and dispatch
//!
//! A request names a tool either exactly or through free text. Free text is
//! handed to an [`IntentClassifier`], whose answer is validated against the
//! [`ToolRegistry`] before anything runs. Declared parameters are collected
//! up front so a handler never sees partial arguments, and every handler
//! failure comes back as [`InvocationResult::Failure`].

mod classifier;
mod dispatcher;
mod registry;

pub use classifier::{IntentClassifier, LlmIntentClassifier, StaticClassifier, build_intent_prompt};
pub use dispatcher::{ArgumentSource, NonInteractive, ToolRouter};
pub use registry::ToolRegistry;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, RouterError};

/// Prefix printed in front of every user-facing failure
pub const FAILURE_MARKER: &str = "❌";

/// Name, description and ordered parameter names of a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn declares(&self, param: &str) -> bool {
        self.parameters.iter().any(|p| p == param)
    }
}

/// Argument values keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(BTreeMap<String, String>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of a declared parameter, or MissingArgument naming the tool
    pub fn require(&self, tool: &str, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| RouterError::MissingArgument {
            tool: tool.to_string(),
            param: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One user turn: a tool name (or free text) plus whatever arguments are known
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    pub tool_name: String,
    pub arguments: Arguments,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Outcome of a dispatch; failures never escape as errors
#[derive(Debug)]
pub enum InvocationResult {
    Success(String),
    Failure(RouterError),
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Text of a success, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            InvocationResult::Success(text) => Some(text),
            InvocationResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RouterError> {
        match self {
            InvocationResult::Success(_) => None,
            InvocationResult::Failure(err) => Some(err),
        }
    }
}

impl fmt::Display for InvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationResult::Success(text) => write!(f, "{}", text),
            InvocationResult::Failure(err) => write!(f, "{} {}", FAILURE_MARKER, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_spec_keeps_parameter_order() {
        let spec = ToolSpec::new("write_file", "Write content to a file", &["path", "content"]);
        assert_eq!(spec.parameters, vec!["path", "content"]);
        assert!(spec.declares("content"));
        assert!(!spec.declares("mode"));
    }

    #[test]
    fn test_arguments_require() {
        let args = Arguments::new().with("path", "notes.txt");
        assert_eq!(args.require("read_file", "path").unwrap(), "notes.txt");

        let err = args.require("write_file", "content").unwrap_err();
        assert!(matches!(err, RouterError::MissingArgument { ref param, .. } if param == "content"));
    }

    #[test]
    fn test_arguments_from_pairs() {
        let args: Arguments = [("path", "a.txt"), ("content", "hi")].into_iter().collect();
        assert_eq!(args.len(), 2);
        assert_eq!(args.names().collect::<Vec<_>>(), vec!["content", "path"]);
    }

    #[test]
    fn test_result_display() {
        assert_eq!(InvocationResult::Success("done".into()).to_string(), "done");

        let failure = InvocationResult::Failure(RouterError::NotFound("x".into()));
        assert!(failure.to_string().starts_with(FAILURE_MARKER));
        assert!(failure.is_failure());
        assert!(failure.text().is_none());
    }
}
