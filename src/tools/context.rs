//! Tool execution context - working directory and backends

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::search::{DuckDuckGoSearch, WebSearch};
use crate::config::Config;
use crate::error::{Result, RouterError};
use crate::llm::LlmClient;

/// Everything a tool may touch. Built once, shared by every dispatch.
#[derive(Clone)]
pub struct ToolContext {
    /// Relative paths resolve against this directory
    pub workdir: PathBuf,

    /// Language-model backend for prompt-forwarding tools
    pub llm: Arc<dyn LlmClient>,

    /// Web search backend
    pub search: Arc<dyn WebSearch>,

    /// Shared HTTP client for fetches and downloads
    pub http: Client,

    pub max_search_results: usize,
    pub download_timeout: Duration,
}

impl ToolContext {
    pub fn new(workdir: PathBuf, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            workdir,
            llm,
            search: Arc::new(DuckDuckGoSearch::default()),
            http: Client::new(),
            max_search_results: 10,
            download_timeout: Duration::from_secs(20),
        }
    }

    /// Context wired from configuration
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.llm.timeout())
            .build()
            .map_err(|e| RouterError::BackendUnavailable(format!("Failed to create HTTP client: {}", e)))?;
        let search = DuckDuckGoSearch::new(
            config.search.endpoint.clone(),
            Duration::from_millis(config.search.timeout_ms),
        );

        Ok(Self {
            workdir: config.agent.resolved_workdir(),
            llm,
            search: Arc::new(search),
            http,
            max_search_results: config.search.max_results,
            download_timeout: Duration::from_millis(config.search.download_timeout_ms),
        })
    }

    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = search;
        self
    }

    /// Resolve a path relative to the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.workdir.join(path) }
    }

    /// Get the working directory
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}
