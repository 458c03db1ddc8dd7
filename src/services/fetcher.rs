// src/services/fetcher.rs

//! Source page fetcher.
//!
//! A single GET with browser-like headers and a hard timeout. No retries,
//! no caching, no parsing: markup in, markup or a network error out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, FetchResult, NetworkErrorKind, Result};
use crate::models::FetcherConfig;
use crate::utils::http::create_async_client;

/// Retrieves raw markup for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the fetcher configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        log::info!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::network(
                url,
                NetworkErrorKind::Status(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_reqwest(url, &e))?;

        log::info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetcherConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_browser_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/series")
                    .header_exists("user-agent")
                    .header("accept-language", "en-US,en;q=0.5");
                then.status(200).body("<html>ok</html>");
            })
            .await;

        let body = fetcher()
            .fetch(&server.url("/series"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(body, "<html>ok</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_network_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/series");
                then.status(403).body("forbidden");
            })
            .await;

        let err = fetcher()
            .fetch(&server.url("/series"), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.network_kind(), Some(NetworkErrorKind::Status(403)));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_network_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_millis(1500)).body("late");
            })
            .await;

        let err = fetcher()
            .fetch(&server.url("/slow"), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert_eq!(err.network_kind(), Some(NetworkErrorKind::Timeout));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        // Port 9 (discard) is not expected to be listening on loopback.
        let err = fetcher()
            .fetch("http://127.0.0.1:9/", Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(err.network_kind().is_some());
    }
}
