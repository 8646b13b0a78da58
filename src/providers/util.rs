use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use tracing::debug;

pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("goldfolio/0.1")
        .build()
        .context("Failed to build HTTP client")
}

/// Performs a single GET and returns the body as text.
///
/// The whole exchange, body included, is bounded by `timeout`. Dropping the
/// request on timeout cancels it. Non-success statuses are errors.
pub async fn fetch_text(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<String> {
    debug!("Requesting {} (timeout {:?})", url, timeout);

    let request = async {
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request error for URL: {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for URL: {}", response.status(), url));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for URL: {url}"))
    };

    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| anyhow!("Request timed out after {:?} for URL: {}", timeout, url))?
}
