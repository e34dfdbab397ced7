//! PDF tools - search and download, and summarize

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;

use super::{Tool, ToolContext};
use crate::error::{Result, RouterError, panic_message};
use crate::router::Arguments;

const MAX_FILENAME_STEM: usize = 50;
const SUMMARY_PAGES: usize = 3;
const SUMMARY_INPUT_CHARS: usize = 2000;

/// Filename stem for a query: runs of non-word characters become `_`
pub fn sanitize_filename(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_run = false;
    for c in query.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out.chars().take(MAX_FILENAME_STEM).collect()
}

/// Text of a PDF, page by page, optionally stopping after `max_pages`.
///
/// Extraction runs on the blocking pool. The extractor panics on some
/// malformed documents; that comes back as a `Tool` error.
pub async fn extract_pdf_text(bytes: Vec<u8>, max_pages: Option<usize>) -> Result<String> {
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                RouterError::Tool(format!("PDF error: {}", panic_message(e.into_panic().as_ref())))
            } else {
                RouterError::Tool(format!("PDF error: {}", e))
            }
        })?
        .map_err(|e| RouterError::Tool(format!("PDF error: {}", e)))?;

    debug!("Extracted {} pages", pages.len());
    let take = max_pages.unwrap_or(pages.len());
    Ok(pages.into_iter().take(take).collect::<Vec<_>>().join("\n"))
}

/// Where a download is written before it replaces `target`
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

pub struct SearchPdfTool;

impl SearchPdfTool {
    /// Stream `url` to `target`. `target` is only touched once the whole body arrived.
    async fn download(&self, url: &str, target: &Path, ctx: &ToolContext) -> Result<()> {
        let response = ctx
            .http
            .get(url)
            .timeout(ctx.download_timeout)
            .send()
            .await?
            .error_for_status()?;

        let partial = partial_path(target);
        let written = write_body(response, &partial).await;
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, target)
            .await
            .map_err(|e| RouterError::file(target.display().to_string(), e))
    }
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| RouterError::file(path.display().to_string(), e))?;

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

#[async_trait]
impl Tool for SearchPdfTool {
    fn name(&self) -> &'static str {
        "search_and_download_pdf"
    }

    fn description(&self) -> &'static str {
        "Search and auto-download first PDF for query"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["query"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let query = args.require(self.name(), "query")?;

        let hits = ctx
            .search
            .search(&format!("{} filetype:pdf", query), ctx.max_search_results)
            .await?;

        let pdf_urls: Vec<String> = hits
            .into_iter()
            .map(|hit| hit.url)
            .filter(|url| url.to_lowercase().ends_with(".pdf"))
            .collect();

        if pdf_urls.is_empty() {
            return Err(RouterError::NotFound("No PDF links found.".to_string()).into());
        }

        let stem = sanitize_filename(query);
        for (i, url) in pdf_urls.iter().enumerate() {
            let filename = format!("{}_{}.pdf", stem, i + 1);
            let target = ctx.resolve(Path::new(&filename));

            info!("Trying URL {}: {}", i + 1, url);
            match self.download(url, &target, ctx).await {
                Ok(()) => return Ok(format!("PDF downloaded: {} (from {})", filename, url)),
                Err(e) => warn!("Skipping broken link: {} ({})", url, e),
            }
        }

        Err(RouterError::BackendUnavailable("All found links failed to download.".to_string()).into())
    }
}

pub struct SummarizePdfTool;

#[async_trait]
impl Tool for SummarizePdfTool {
    fn name(&self) -> &'static str {
        "summarize_pdf"
    }

    fn description(&self) -> &'static str {
        "Summarize content from a PDF"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["path"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let path = args.require(self.name(), "path")?;
        let bytes = tokio::fs::read(ctx.resolve(Path::new(path)))
            .await
            .map_err(|e| RouterError::file(path, e))?;

        let text = extract_pdf_text(bytes, Some(SUMMARY_PAGES)).await?;
        let excerpt: String = text.chars().take(SUMMARY_INPUT_CHARS).collect();

        let summary = ctx.llm.generate(&format!("Summarize this:\n{}", excerpt)).await?;
        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::tools::{SearchHit, WebSearch};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Assemble a PDF from object bodies, numbered from 1, with a valid xref table
    pub(crate) fn build_pdf(objects: &[&str]) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .as_bytes(),
        );
        out
    }

    /// A page that draws text with a font it never declares
    pub(crate) fn pdf_without_resources() -> Vec<u8> {
        build_pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
            "<< /Length 23 >>\nstream\nBT /F1 12 Tf (Hi) Tj ET\nendstream",
        ])
    }

    /// One Helvetica text line per page
    fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let font = 3 + 2 * lines.len();
        let kids: Vec<String> = (0..lines.len()).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), lines.len()),
        ];
        for (i, line) in lines.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", line);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
                font,
                4 + 2 * i
            ));
            objects.push(format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let refs: Vec<&str> = objects.iter().map(String::as_str).collect();
        build_pdf(&refs)
    }

    struct CannedSearch(Vec<&'static str>);

    #[async_trait]
    impl WebSearch for CannedSearch {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(self
                .0
                .iter()
                .take(max_results)
                .map(|url| SearchHit {
                    title: String::new(),
                    url: url.to_string(),
                })
                .collect())
        }
    }

    fn ctx(dir: &Path, urls: Vec<&'static str>) -> ToolContext {
        ToolContext::new(dir.to_path_buf(), Arc::new(MockLlmClient::default()))
            .with_search(Arc::new(CannedSearch(urls)))
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("rust async book"), "rust_async_book");
        assert_eq!(sanitize_filename("C++ / C#: intro!!"), "C_C_intro_");
        assert_eq!(sanitize_filename("snake_case stays"), "snake_case_stays");
    }

    #[test]
    fn test_sanitize_filename_truncates() {
        let long = "word ".repeat(30);
        assert_eq!(sanitize_filename(&long).chars().count(), 50);
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(partial_path(Path::new("/tmp/a_1.pdf")), PathBuf::from("/tmp/a_1.pdf.part"));
    }

    #[tokio::test]
    async fn test_extract_stops_after_max_pages() {
        let pdf = pdf_with_pages(&["alpha", "bravo", "charlie", "delta"]);

        let first = extract_pdf_text(pdf.clone(), Some(SUMMARY_PAGES)).await.unwrap();
        assert!(first.contains("alpha"));
        assert!(first.contains("charlie"));
        assert!(!first.contains("delta"));

        let all = extract_pdf_text(pdf, None).await.unwrap();
        assert!(all.contains("delta"));
    }

    #[tokio::test]
    async fn test_summarize_sends_first_pages() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("doc.pdf"), pdf_with_pages(&["alpha", "bravo", "charlie", "delta"])).unwrap();
        let mock = Arc::new(MockLlmClient::new(vec![" A short summary. "]));
        let ctx = ToolContext::new(dir.path().to_path_buf(), mock.clone());

        let summary = SummarizePdfTool
            .execute(&Arguments::new().with("path", "doc.pdf"), &ctx)
            .await
            .unwrap();

        assert_eq!(summary, "A short summary.");
        let prompt = &mock.prompts()[0];
        assert!(prompt.starts_with("Summarize this:\n"));
        assert!(prompt.contains("alpha"));
        assert!(!prompt.contains("delta"));
    }

    #[tokio::test]
    async fn test_no_pdf_links() {
        let dir = tempdir().unwrap();
        let ctx = ctx(dir.path(), vec!["https://example.com/index.html"]);

        let err = SearchPdfTool
            .execute(&Arguments::new().with("query", "anything"), &ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No PDF links found."));
    }

    #[tokio::test]
    async fn test_all_links_broken() {
        let dir = tempdir().unwrap();
        let ctx = ctx(dir.path(), vec!["http://127.0.0.1:9/a.pdf", "http://127.0.0.1:9/b.PDF"]);

        let err = SearchPdfTool
            .execute(&Arguments::new().with("query", "broken"), &ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("All found links failed to download."));
        assert!(!dir.path().join("broken_1.pdf").exists());
        assert!(!dir.path().join("broken_2.pdf").exists());
        assert!(!dir.path().join("broken_1.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_failed_download_keeps_existing_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("rust_book_1.pdf"), "earlier download").unwrap();
        let ctx = ctx(dir.path(), vec!["http://127.0.0.1:9/book.pdf"]);

        let err = SearchPdfTool
            .execute(&Arguments::new().with("query", "rust book"), &ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("All found links failed to download."));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("rust_book_1.pdf")).unwrap(),
            "earlier download"
        );
    }

    #[tokio::test]
    async fn test_summarize_missing_pdf() {
        let dir = tempdir().unwrap();
        let ctx = ctx(dir.path(), vec![]);

        let err = SummarizePdfTool
            .execute(&Arguments::new().with("path", "nope.pdf"), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<RouterError>(), Some(RouterError::FileAccess { .. })));
    }

    #[tokio::test]
    async fn test_summarize_rejects_non_pdf() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("fake.pdf"), "definitely not a pdf").unwrap();
        let ctx = ctx(dir.path(), vec![]);

        let err = SummarizePdfTool
            .execute(&Arguments::new().with("path", "fake.pdf"), &ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("PDF error"));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_an_error_not_a_panic() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.pdf"), pdf_without_resources()).unwrap();
        let ctx = ctx(dir.path(), vec![]);

        let result = SummarizePdfTool
            .execute(&Arguments::new().with("path", "broken.pdf"), &ctx)
            .await;

        assert!(result.is_err());
    }
}
