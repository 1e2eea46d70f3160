//! Retrying HTTP transport shared by the network-backed registry adapters.

use crate::error::{AuditError, Result};
use reqwest::blocking::{Client, Request, Response};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Retry budget and backoff shape for one request sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `max_retries + 1` attempts total.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            backoff_multiplier: 2,
        }
    }
}

/// A blocking HTTP client that retries failed requests with exponential
/// backoff.
///
/// A non-2xx response or a transport-level failure counts as a failed
/// attempt. The underlying client (and its connection pool) is shared
/// across requests; every retry executes its own clone of the request.
#[derive(Debug)]
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, policy })
    }

    /// Execute `request`, retrying per the policy. Returns the first
    /// successful response, or a terminal error carrying the last response
    /// code and body (or the underlying transport error).
    pub fn execute_with_retry(&self, request: Request) -> Result<Response> {
        let url = request.url().clone();
        let mut delay = self.policy.initial_delay;
        let mut attempt: u32 = 0;

        loop {
            let next = request
                .try_clone()
                .ok_or_else(|| AuditError::network("Request body cannot be cloned for retry"))?;

            match self.client.execute(next) {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .unwrap_or_else(|_| "No response body".to_string());
                    if attempt == self.policy.max_retries {
                        return Err(AuditError::HttpError {
                            url: url.to_string(),
                            attempts: attempt + 1,
                            status,
                            body,
                        });
                    }
                    warn!(
                        "Request to {url} failed with code {status}. Retrying ({}/{})...",
                        attempt + 1,
                        self.policy.max_retries
                    );
                }
                Err(e) => {
                    if attempt == self.policy.max_retries {
                        return Err(AuditError::network(format!(
                            "Request to {url} failed after {} attempts: {e}",
                            attempt + 1
                        )));
                    }
                    warn!(
                        "Request to {url} failed: {e}. Retrying ({}/{})...",
                        attempt + 1,
                        self.policy.max_retries
                    );
                }
            }

            debug!("Waiting {delay:?} before retry");
            std::thread::sleep(delay);
            delay *= self.policy.backoff_multiplier;
            attempt += 1;
        }
    }

    /// GET `url` with retries.
    pub fn get(&self, url: &str) -> Result<Response> {
        let request = self.client.get(url).build()?;
        self.execute_with_retry(request)
    }

    /// GET `url?query` with retries. Query values are form-encoded.
    pub fn get_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let request = self.client.get(url).query(query).build()?;
        self.execute_with_retry(request)
    }

    /// Header-only request; the body is never downloaded.
    pub fn head(&self, url: &str) -> Result<Response> {
        let request = self.client.head(url).build()?;
        self.execute_with_retry(request)
    }
}
