//! Error types for toolrouter
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while routing and running tools
#[derive(Debug, Error)]
pub enum RouterError {
    /// Unknown tool, path or URL
    #[error("Not found: {0}")]
    NotFound(String),

    /// A tool with the same name is already registered
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    /// Free text did not resolve to a registered tool
    #[error("unknown tool or intent: '{input}'")]
    Classification { input: String },

    /// A declared parameter has no value and none could be acquired
    #[error("Missing value for parameter '{param}' of tool '{tool}'")]
    MissingArgument { tool: String, param: String },

    /// An argument was supplied that the tool does not declare
    #[error("Unexpected parameter '{param}' for tool '{tool}'")]
    UnexpectedArgument { tool: String, param: String },

    /// Network or connection failure talking to a backend
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local file read/write failure
    #[error("Failed to access '{path}': {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Handler failure that carries no richer type
    #[error("Tool error: {0}")]
    Tool(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouterError {
    /// Wrap an IO error with the path it happened on
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        RouterError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from a remote backend rather than local state
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            RouterError::BackendUnavailable(_) | RouterError::Api { .. } | RouterError::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for RouterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RouterError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            RouterError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RouterError::BackendUnavailable(err.to_string())
        }
    }
}

/// Text of a panic payload, for reporting a caught panic as an error
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Result type alias for toolrouter operations
pub type Result<T> = std::result::Result<T, RouterError>;
