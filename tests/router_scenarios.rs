//! Router integration tests
//!
//! Drives the standard registry end to end through the public API with a
//! scripted LLM client standing in for the local model.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use toolrouter::error::{Result, RouterError};
use toolrouter::llm::MockLlmClient;
use toolrouter::router::{Arguments, InvocationRequest, LlmIntentClassifier, NonInteractive, ToolRouter};
use toolrouter::tools::{ListFilesTool, ToolContext, standard_registry};

/// Router whose classifier asks the same mock the tools use
fn router(dir: &Path, mock: Arc<MockLlmClient>) -> Result<ToolRouter> {
    let classifier = Arc::new(LlmIntentClassifier::new(mock.clone()));
    let registry = standard_registry(classifier.clone())?;
    Ok(ToolRouter::new(registry, classifier, ToolContext::new(dir.to_path_buf(), mock)))
}

#[tokio::test]
async fn test_read_missing_file_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let router = router(dir.path(), Arc::new(MockLlmClient::default()))?;

    let request = InvocationRequest::new("read_file").with_arguments(Arguments::new().with("path", "missing.txt"));
    let result = router.dispatch(request, &mut NonInteractive).await;

    assert!(result.is_failure());
    assert!(matches!(result.error(), Some(RouterError::FileAccess { .. })));
    assert!(result.to_string().contains("missing.txt"));
    Ok(())
}

#[tokio::test]
async fn test_free_text_routes_to_list_files() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("a.txt"), "alpha")?;
    let mock = Arc::new(MockLlmClient::new(vec!["list_files\n"]));
    let router = router(dir.path(), mock.clone())?;

    let result = router.dispatch(InvocationRequest::new("frobnicate"), &mut NonInteractive).await;

    assert_eq!(result.text(), Some("a.txt"));
    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("'frobnicate'"));
    assert!(prompts[0].contains("list_files"));
    Ok(())
}

#[tokio::test]
async fn test_unmatched_intent_fails_without_side_effects() -> Result<()> {
    let dir = TempDir::new()?;
    let mock = Arc::new(MockLlmClient::new(vec!["I think you want to delete_everything"]));
    let router = router(dir.path(), mock.clone())?;

    let result = router
        .dispatch(InvocationRequest::new("please wipe the disk"), &mut NonInteractive)
        .await;

    assert!(matches!(result.error(), Some(RouterError::Classification { .. })));
    assert_eq!(mock.prompts().len(), 1);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_exact_name_never_asks_the_model() -> Result<()> {
    let dir = TempDir::new()?;
    let mock = Arc::new(MockLlmClient::default());
    let router = router(dir.path(), mock.clone())?;

    let result = router.dispatch(InvocationRequest::new("list_files"), &mut NonInteractive).await;

    assert_eq!(result.text(), Some("(empty directory)"));
    assert!(mock.prompts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_write_then_read() -> Result<()> {
    let dir = TempDir::new()?;
    let router = router(dir.path(), Arc::new(MockLlmClient::default()))?;
    let text = "line one\nline two\n";

    let write = InvocationRequest::new("write_file")
        .with_arguments(Arguments::new().with("path", "out/notes.txt").with("content", text));
    let written = router.dispatch(write, &mut NonInteractive).await;
    assert_eq!(written.text(), Some("File 'out/notes.txt' written successfully."));

    let read = InvocationRequest::new("read_file").with_arguments(Arguments::new().with("path", "out/notes.txt"));
    let read = router.dispatch(read, &mut NonInteractive).await;
    assert_eq!(read.text(), Some(text));
    Ok(())
}

#[tokio::test]
async fn test_missing_argument_never_reaches_handler() -> Result<()> {
    let dir = TempDir::new()?;
    let router = router(dir.path(), Arc::new(MockLlmClient::default()))?;

    let request = InvocationRequest::new("write_file").with_arguments(Arguments::new().with("path", "x.txt"));
    let result = router.dispatch(request, &mut NonInteractive).await;

    assert!(matches!(
        result.error(),
        Some(RouterError::MissingArgument { param, .. }) if param == "content"
    ));
    assert!(!dir.path().join("x.txt").exists());
    Ok(())
}

#[tokio::test]
async fn test_ask_llm_and_detect_intent() -> Result<()> {
    let dir = TempDir::new()?;
    let mock = Arc::new(MockLlmClient::new(vec!["Blue, mostly.", "summarize_pdf"]));
    let router = router(dir.path(), mock.clone())?;

    let ask = InvocationRequest::new("ask_llm").with_arguments(Arguments::new().with("prompt", "What colour is the sky?"));
    assert_eq!(router.dispatch(ask, &mut NonInteractive).await.text(), Some("Blue, mostly."));

    let detect =
        InvocationRequest::new("detect_intent").with_arguments(Arguments::new().with("prompt", "shorten this paper"));
    assert_eq!(router.dispatch(detect, &mut NonInteractive).await.text(), Some("summarize_pdf"));
    Ok(())
}

#[test]
fn test_registry_contents_and_duplicates() -> Result<()> {
    let classifier = Arc::new(toolrouter::router::StaticClassifier::new("none"));
    let mut registry = standard_registry(classifier)?;

    let names = registry.names();
    assert_eq!(names.first().map(String::as_str), Some("list_files"));
    assert_eq!(names.last().map(String::as_str), Some("detect_intent"));
    assert_eq!(registry.len(), 9);
    assert_eq!(registry.lookup("write_file")?.parameters, vec!["path", "content"]);

    assert!(matches!(
        registry.register(Box::new(ListFilesTool)),
        Err(RouterError::DuplicateName(name)) if name == "list_files"
    ));
    Ok(())
}
