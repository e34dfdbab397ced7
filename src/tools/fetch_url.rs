//! fetch_url tool - HTTP GET a URL and return the body

use async_trait::async_trait;

use super::{Tool, ToolContext, truncate_output};
use crate::error::RouterError;
use crate::router::Arguments;

const MAX_BODY_BYTES: usize = 100_000;

pub struct FetchUrlTool;

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &'static str {
        "fetch_url"
    }

    fn description(&self) -> &'static str {
        "Fetch a web page and return its text"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["url"]
    }

    async fn execute(&self, args: &Arguments, ctx: &ToolContext) -> eyre::Result<String> {
        let url = args.require(self.name(), "url")?.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RouterError::NotFound(format!("URL '{}' (expected http:// or https://)", url)).into());
        }

        let response = ctx
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RouterError::BackendUnavailable(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RouterError::NotFound(format!("URL '{}'", url)).into());
        }
        if !status.is_success() {
            return Err(RouterError::Api {
                status: status.as_u16(),
                message: format!("GET {}", url),
            }
            .into());
        }

        let body = response.text().await.map_err(RouterError::from)?;
        Ok(truncate_output(body, MAX_BODY_BYTES))
    }
}
