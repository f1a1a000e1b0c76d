//! Protocol trait for HTTP fetching.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::config::FetchConfig;
use crate::errors::NavigationError;

/// Result of a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body as text.
    pub text: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// Content type from headers.
    pub content_type: Option<String>,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchResult {
    /// Creates a result with a status and body.
    #[must_use]
    pub fn new(url: impl Into<String>, status_code: u16, text: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            text: text.into(),
            final_url: url.into(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            duration_ms: 0.0,
        }
    }

    /// Whether the response is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    }

    /// Whether the fetch was successful (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Protocol for HTTP fetching.
///
/// Dropping the returned future must abort the request; that is how a
/// superseded navigation releases its connection.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL with the given request headers.
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResult, NavigationError>;
}

/// Fetches `url` as a soft-navigation request and returns the body.
///
/// A non-success status is a failure.
pub async fn fetch_html(
    fetcher: &dyn Fetcher,
    url: &str,
    config: &FetchConfig,
) -> Result<String, NavigationError> {
    let result = fetcher.fetch(url, &config.request_headers()).await?;
    if !result.is_success() {
        return Err(NavigationError::status(url, result.status_code));
    }
    if !result.is_html() {
        debug!(url, content_type = ?result.content_type, "Non-HTML response for navigation");
    }
    Ok(result.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[test]
    fn test_success_range() {
        assert!(FetchResult::new("/", 200, "").is_success());
        assert!(FetchResult::new("/", 204, "").is_success());
        assert!(!FetchResult::new("/", 304, "").is_success());
        assert!(!FetchResult::new("/", 404, "").is_success());
    }

    #[test]
    fn test_is_html() {
        let mut result = FetchResult::new("/", 200, "");
        assert!(result.is_html());
        result.content_type = Some("application/json".to_string());
        assert!(!result.is_html());
        result.content_type = None;
        assert!(!result.is_html());
    }

    #[tokio::test]
    async fn test_fetch_html_sends_soft_nav_headers() {
        let fetcher = MockFetcher::new();
        fetcher.respond("https://example.com/about", 200, "<title>About</title>");

        let html = fetch_html(&fetcher, "https://example.com/about", &FetchConfig::default())
            .await
            .unwrap();

        assert_eq!(html, "<title>About</title>");
        let headers = fetcher.last_headers().unwrap();
        assert_eq!(
            headers.get("X-Requested-With").map(String::as_str),
            Some("X-Wisp-Navigate")
        );
        assert_eq!(headers.get("Accept").map(String::as_str), Some("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_html_rejects_error_status() {
        let fetcher = MockFetcher::new();
        fetcher.respond("https://example.com/missing", 404, "not found");

        let err = fetch_html(&fetcher, "https://example.com/missing", &FetchConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err, NavigationError::status("https://example.com/missing", 404));
    }
}
