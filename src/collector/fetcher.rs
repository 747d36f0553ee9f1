//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by collectors:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests for the contest index and contest detail pages
//! - Error classification into [`NetworkError`]
//!
//! There is no retry here. A failed contest page is reported to the caller,
//! which decides whether the batch continues.

use crate::collector::extractor::parse_contest_index;
use crate::collector::types::ContestSummary;
use crate::config::{CollectorConfig, UserAgentConfig};
use crate::NetworkError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `collector` - Supplies the request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    collector: &CollectorConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(collector.request_timeout_secs))
        .connect_timeout(Duration::from_secs(collector.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher shared by the collectors
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a page body
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | body text |
    /// | any other status | `NetworkError::Status` |
    /// | timeout (request or body) | `NetworkError::Timeout` |
    /// | DNS, refused, reset, TLS | `NetworkError::Transport` |
    pub async fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }

    /// Fetches the contest index and returns at most `limit` contests in page order
    ///
    /// An index page without any recognisable contest cards yields an empty
    /// list rather than an error.
    pub async fn list_contests(
        &self,
        index_url: &str,
        limit: usize,
    ) -> Result<Vec<ContestSummary>, NetworkError> {
        let html = self.fetch(index_url).await?;
        let contests = parse_contest_index(&html, index_url, limit);

        if contests.is_empty() {
            tracing::warn!("No contests found on index page {}", index_url);
        } else {
            tracing::debug!("Found {} contests on {}", contests.len(), index_url);
        }

        Ok(contests)
    }
}

fn classify(url: &str, error: reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        NetworkError::Transport {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        NetworkError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
