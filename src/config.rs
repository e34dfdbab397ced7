use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub search: SearchConfig,
    pub rag: RagConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    /// Model behind `/api/generate` (tools, intent classification)
    pub model: String,
    /// Model behind `/api/chat` and the chat session
    pub chat_model: String,
    pub embedding_model: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            chat_model: "llama3.2:1b".to_string(),
            embedding_model: "all-minilm".to_string(),
            timeout_ms: 120000,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub exit_token: String,
    /// Directory the file tools operate in (default: current directory)
    pub workdir: Option<PathBuf>,
    /// Whether picking `ask_llm` in the agent opens a chat session
    pub chat_session: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            exit_token: "exit".to_string(),
            workdir: None,
            chat_session: true,
        }
    }
}

impl AgentConfig {
    pub fn resolved_workdir(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_ms: u64,
    pub download_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_results: 10,
            timeout_ms: 15000,
            download_timeout_ms: 20000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub memory_file: PathBuf,
    pub user_name: String,
    pub tone: String,
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub dimension: usize,
    /// Characters per document chunk for question answering
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Chunks passed as context to each answer
    pub qa_top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            memory_file: PathBuf::from("chat_memory.json"),
            user_name: "Meet".to_string(),
            tone: "friendly".to_string(),
            top_k: 3,
            similarity_threshold: 0.6,
            dimension: 384,
            chunk_size: 1000,
            chunk_overlap: 200,
            qa_top_k: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            agent: AgentConfig::default(),
            search: SearchConfig::default(),
            rag: RagConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
