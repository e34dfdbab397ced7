//! read_file tool - Read file contents

use async_trait::async_trait;
use std::path::Path;

use super::{Tool, ToolContext};
use crate::error::RouterError;
use crate::router::Arguments;

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read a file"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["path"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let path = args.require(self.name(), "path")?;
        let full_path = ctx.resolve(Path::new(path));

        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| RouterError::file(path, e))?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn ctx(dir: &Path) -> ToolContext {
        ToolContext::new(dir.to_path_buf(), Arc::new(MockLlmClient::default()))
    }

    #[tokio::test]
    async fn test_read_file_verbatim() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), "line 1\nline 2\n\ttabbed").unwrap();

        let result = ReadFileTool
            .execute(&Arguments::new().with("path", "test.txt"), &ctx(dir.path()))
            .await
            .unwrap();

        assert_eq!(result, "line 1\nline 2\n\ttabbed");
    }

    #[tokio::test]
    async fn test_read_file_nested() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/nested.txt"), "deep").unwrap();

        let result = ReadFileTool
            .execute(&Arguments::new().with("path", "sub/nested.txt"), &ctx(dir.path()))
            .await
            .unwrap();

        assert_eq!(result, "deep");
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let dir = tempdir().unwrap();

        let err = ReadFileTool
            .execute(&Arguments::new().with("path", "nonexistent.txt"), &ctx(dir.path()))
            .await
            .unwrap_err();

        let err = err.downcast::<RouterError>().unwrap();
        match err {
            RouterError::FileAccess { path, source } => {
                assert_eq!(path, "nonexistent.txt");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_read_file_requires_path() {
        let dir = tempdir().unwrap();
        let result = ReadFileTool.execute(&Arguments::new(), &ctx(dir.path())).await;
        assert!(result.is_err());
    }
}
