//! list_files tool - List entries of the working directory

use async_trait::async_trait;

use super::{Tool, ToolContext};
use crate::error::RouterError;
use crate::router::Arguments;

pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &'static str {
        "list_files"
    }

    fn description(&self) -> &'static str {
        "List files in the current folder"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &[]
    }

    async fn execute(&self, _args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let workdir = ctx.workdir();
        let display = workdir.display().to_string();

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(workdir)
            .await
            .map_err(|e| RouterError::file(display.clone(), e))?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| RouterError::file(display.clone(), e))? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);

            let suffix = if is_dir { "/" } else { "" };
            entries.push(format!("{}{}", name, suffix));
        }

        entries.sort();

        if entries.is_empty() {
            Ok("(empty directory)".to_string())
        } else {
            Ok(entries.join("\n"))
        }
    }
}
