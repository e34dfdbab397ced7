//! Tool registry - name to spec and handler, in registration order

use std::collections::HashMap;

use super::ToolSpec;
use crate::error::{Result, RouterError};
use crate::tools::Tool;

struct Entry {
    spec: ToolSpec,
    tool: Box<dyn Tool>,
}

/// Registered tools. Filled once at startup, read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a second tool with the same name is rejected
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let spec = tool.spec();
        if self.index.contains_key(&spec.name) {
            return Err(RouterError::DuplicateName(spec.name));
        }

        log::debug!("Registering tool '{}' ({:?})", spec.name, spec.parameters);
        self.index.insert(spec.name.clone(), self.entries.len());
        self.entries.push(Entry { spec, tool });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ToolSpec> {
        self.entry(name).map(|e| &e.spec)
    }

    pub(crate) fn handler(&self, name: &str) -> Result<&dyn Tool> {
        self.entry(name).map(|e| e.tool.as_ref())
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| RouterError::NotFound(format!("tool '{}'", name)))
    }

    /// (name, description) pairs in registration order
    pub fn list_all(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.spec.name.as_str(), e.spec.description.as_str()))
    }

    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> + '_ {
        self.entries.iter().map(|e| &e.spec)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.spec.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
