//! Page fetching through a chain of fallback endpoints
//!
//! The target URL is tried directly first, then through each configured
//! read-through proxy in order. The first endpoint that answers with a
//! success status wins.

use crate::error::{Result, SeoscopeError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the page fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Request timeout (default: 30 seconds)
    pub request_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
    /// Proxy URL prefixes; the percent-encoded target URL is appended
    pub proxies: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            proxies: vec![
                "https://api.allorigins.win/raw?url=".to_string(),
                "https://corsproxy.io/?".to_string(),
                "https://api.codetabs.com/v1/proxy?quest=".to_string(),
            ],
        }
    }
}

/// Fetcher that retrieves remote HTML with proxy fallback
pub struct PageFetcher {
    client: Client,
    config: FetcherConfig,
}

impl PageFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SeoscopeError::FetchError {
                url: "client_init".to_string(),
                source: e,
            })?;

        Ok(Self { client, config })
    }

    /// Fetch a URL, falling back through the proxy chain until one succeeds
    pub async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching URL: {}", url);

        let endpoints = self.endpoints_for(url);
        let mut last_error = String::new();

        for (attempt, endpoint) in endpoints.iter().enumerate() {
            if attempt > 0 {
                warn!(
                    "Endpoint failed, trying fallback {}/{}",
                    attempt,
                    endpoints.len() - 1
                );
            }

            match self.fetch_once(endpoint).await {
                Ok(html) => {
                    debug!("Fetched {} bytes via {}", html.len(), endpoint);
                    return Ok(html);
                }
                Err(e) => {
                    last_error = e.to_string();
                    debug!("Fetch failed for {}: {}", endpoint, last_error);
                }
            }
        }

        Err(SeoscopeError::ProxiesExhausted {
            url: url.to_string(),
            attempts: endpoints.len(),
            last_error,
        })
    }

    /// Direct URL first, then each proxy wrapping the encoded target
    fn endpoints_for(&self, url: &str) -> Vec<String> {
        let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
        let mut endpoints = vec![url.to_string()];
        endpoints.extend(
            self.config
                .proxies
                .iter()
                .map(|prefix| format!("{prefix}{encoded}")),
        );
        endpoints
    }

    async fn fetch_once(&self, endpoint: &str) -> Result<String> {
        let response = self
            .client
            .get(endpoint)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| SeoscopeError::FetchError {
                url: endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeoscopeError::HttpStatusError {
                url: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SeoscopeError::FetchError {
                url: endpoint.to_string(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_carries_three_proxies() {
        let config = FetcherConfig::default();
        assert_eq!(config.proxies.len(), 3);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn endpoints_start_with_the_direct_url() {
        let fetcher = PageFetcher::new().unwrap();
        let endpoints = fetcher.endpoints_for("https://example.com/page?a=1");
        assert_eq!(endpoints.len(), 4);
        assert_eq!(endpoints[0], "https://example.com/page?a=1");
        assert!(endpoints[1].starts_with("https://api.allorigins.win/raw?url="));
        // Target URL is percent-encoded inside the proxy URL
        assert!(endpoints[1].contains("https%3A%2F%2Fexample.com%2Fpage%3Fa%3D1"));
    }

    #[test]
    fn custom_proxy_list_is_respected() {
        let config = FetcherConfig {
            proxies: vec!["https://proxy.test/?u=".to_string()],
            ..Default::default()
        };
        let fetcher = PageFetcher::with_config(config).unwrap();
        let endpoints = fetcher.endpoints_for("https://example.com/");
        assert_eq!(endpoints.len(), 2);
        assert!(endpoints[1].starts_with("https://proxy.test/?u="));
    }
}
