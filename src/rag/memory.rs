//! Persisted chat memory
//!
//! Stored as one JSON array of `[role, content]` pairs. The file is read
//! fully on load and overwritten fully on save.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Result, RouterError};
use crate::llm::{ChatMessage, Role};

pub const USER: &str = "user";
pub const ASSISTANT: &str = "assistant";

#[derive(Debug, Clone)]
pub struct ChatMemory {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl ChatMemory {
    /// Load from `path`; a missing file is an empty memory
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| RouterError::file(path.display().to_string(), e))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!("No chat memory at {}, starting empty", path.display());
            Vec::new()
        };

        info!("Loaded {} memory entries from {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| RouterError::file(parent.display().to_string(), e))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).map_err(|e| RouterError::file(self.path.display().to_string(), e))?;
        Ok(())
    }

    pub fn push(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.entries.push((role.into(), content.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// User messages with their position in the memory
    pub fn user_messages(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (role, _))| role == USER)
            .map(|(i, (_, content))| (i, content.as_str()))
    }

    /// Entries as chat messages; unknown roles are sent as user text
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .map(|(role, content)| {
                let role = match role.as_str() {
                    ASSISTANT => Role::Assistant,
                    "system" => Role::System,
                    _ => Role::User,
                };
                ChatMessage {
                    role,
                    content: content.clone(),
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
