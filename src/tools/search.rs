//! Web search backend - DuckDuckGo HTML lite endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, RouterError};

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Text search returning ranked links
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(DDG_HTML_URL, Duration::from_secs(15))
    }
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        log::info!("Searching for '{}'", query);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("q={}&b=", urlencoding::encode(query)))
            .send()
            .await
            .map_err(|e| RouterError::BackendUnavailable(format!("Search failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouterError::Api {
                status: status.as_u16(),
                message: "search endpoint rejected the query".to_string(),
            });
        }

        let html = response.text().await?;
        Ok(parse_ddg_html(&html, max_results))
    }
}

/// Pull result links out of the HTML lite page.
///
/// Each result is an `<a class="result__a" href="...">TITLE</a>`.
pub fn parse_ddg_html(html: &str, max_results: usize) -> Vec<SearchHit> {
    const MARKER: &str = "class=\"result__a\"";

    let mut hits = Vec::new();
    let mut pos = 0;

    while hits.len() < max_results {
        let Some(found) = html[pos..].find(MARKER) else {
            break;
        };
        let marker_pos = pos + found;
        pos = marker_pos + MARKER.len();

        let Some(a_start) = html[..marker_pos].rfind("<a ") else {
            continue;
        };
        let Some(tag_len) = html[a_start..].find('>') else {
            break;
        };
        let tag_end = a_start + tag_len;
        let Some(close) = html[tag_end..].find("</a>") else {
            break;
        };

        let url = extract_attr(&html[a_start..tag_end], "href")
            .map(|href| resolve_ddg_url(&href))
            .unwrap_or_default();
        if url.is_empty() {
            continue;
        }

        let title = strip_tags(&html[tag_end + 1..tag_end + close]);
        hits.push(SearchHit {
            title: html_decode(title.trim()),
            url,
        });
        pos = tag_end + close;
    }

    hits
}

/// DDG wraps links as `//duckduckgo.com/l/?uddg=ENCODED&...`
fn resolve_ddg_url(href: &str) -> String {
    if let Some(rest) = href
        .strip_prefix("//duckduckgo.com/l/?uddg=")
        .or_else(|| href.strip_prefix("/l/?uddg="))
    {
        let encoded = rest.split('&').next().unwrap_or(rest);
        urlencoding::decode(encoded)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| href.to_string())
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        String::new()
    }
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!("{}=\"", attr);
    let start = tag.find(&pattern)? + pattern.len();
    let end = tag[start..].find('"')? + start;
    Some(html_decode(&tag[start..end]))
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result">
  <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpaper.pdf&amp;rut=abc">Deep <b>Learning</b> paper</a>
</div>
<div class="result">
  <a rel="nofollow" class="result__a" href="https://example.org/notes.html">Lecture &amp; notes</a>
</div>
<div class="result">
  <a rel="nofollow" class="result__a" href="javascript:void(0)">Ad</a>
</div>
"#;

    #[test]
    fn test_parse_results() {
        let hits = parse_ddg_html(PAGE, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.com/paper.pdf");
        assert_eq!(hits[0].title, "Deep Learning paper");
        assert_eq!(hits[1].url, "https://example.org/notes.html");
        assert_eq!(hits[1].title, "Lecture & notes");
    }

    #[test]
    fn test_parse_respects_max_results() {
        assert_eq!(parse_ddg_html(PAGE, 1).len(), 1);
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_ddg_html("<html></html>", 10).is_empty());
    }

    #[test]
    fn test_resolve_plain_and_relative_links() {
        assert_eq!(resolve_ddg_url("https://a.b/c"), "https://a.b/c");
        assert_eq!(resolve_ddg_url("/l/?uddg=http%3A%2F%2Fx.y%2Fz.pdf"), "http://x.y/z.pdf");
        assert_eq!(resolve_ddg_url("/settings"), "");
    }
}
