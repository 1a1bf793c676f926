//! Network fetch seam
//!
//! The worker talks to the network through the `Fetcher` trait so tests
//! can substitute a scripted implementation and observe exactly which
//! requests reach the network. `HttpFetcher` is the reqwest-backed
//! implementation used in production.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Errors that can occur when fetching a resource over the network
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, DNS, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The request method is not a valid HTTP method
    #[error("Invalid request method: '{0}'")]
    InvalidMethod(String),

    /// No response could be produced for the URL
    #[error("No response could be produced for '{0}'")]
    Unreachable(String),
}

/// A response as it came off the network
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Returns true for 2xx statuses, the platform convention for a
    /// precache-worthy response
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs network fetches on behalf of the worker
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the resource at `url` with the given request method
    ///
    /// # Returns
    /// * `Ok(FetchedResponse)` for any response the server produced,
    ///   success or not (non-2xx statuses are responses, not errors)
    /// * `Err(FetchError)` if no response could be obtained at all
    async fn fetch(&self, method: &str, url: &Url) -> Result<FetchedResponse, FetchError>;
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a fetcher with a custom HTTP client
    #[allow(dead_code)]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, method: &str, url: &Url) -> Result<FetchedResponse, FetchError> {
        let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| FetchError::InvalidMethod(method.to_string()))?;

        let response = self.client.request(method, url.as_str()).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(FetchedResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_for_2xx_only() {
        let mut response = FetchedResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(response.is_success());

        response.status = 204;
        assert!(response.is_success());

        response.status = 299;
        assert!(response.is_success());

        response.status = 304;
        assert!(!response.is_success());

        response.status = 404;
        assert!(!response.is_success());

        response.status = 500;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_invalid_method() {
        let fetcher = HttpFetcher::new();
        let url = Url::parse("http://localhost:8000/").unwrap();

        let result = fetcher.fetch("NOT A METHOD", &url).await;

        assert!(matches!(result, Err(FetchError::InvalidMethod(_))));
    }
}
