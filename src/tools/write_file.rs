//! write_file and modify_file tools - Write content to a file

use async_trait::async_trait;
use std::path::Path;

use super::{Tool, ToolContext};
use crate::error::RouterError;
use crate::router::Arguments;

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write content to a file"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["path", "content"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let path = args.require(self.name(), "path")?;
        let content = args.require(self.name(), "content")?;

        let full_path = ctx.resolve(Path::new(path));

        // Create parent directories
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RouterError::file(path, e))?;
        }

        tokio::fs::write(&full_path, content)
            .await
            .map_err(|e| RouterError::file(path, e))?;

        Ok(format!("File '{}' written successfully.", path))
    }
}

/// Replaces the whole file, creating it when absent. Parent directories must exist.
pub struct ModifyFileTool;

#[async_trait]
impl Tool for ModifyFileTool {
    fn name(&self) -> &'static str {
        "modify_file"
    }

    fn description(&self) -> &'static str {
        "Modify a file"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["path", "content"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let path = args.require(self.name(), "path")?;
        let content = args.require(self.name(), "content")?;

        let full_path = ctx.resolve(Path::new(path));
        tokio::fs::write(&full_path, content)
            .await
            .map_err(|e| RouterError::file(path, e))?;

        Ok(format!("File '{}' modified successfully.", path))
    }
}
