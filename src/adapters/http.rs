use crate::core::PageSource;
use crate::utils::error::{Result, ScrapeError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const RETRY_STATUSES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each following retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }

    fn retries_status(&self, status: StatusCode) -> bool {
        RETRY_STATUSES.contains(&status)
    }
}

/// Builds the client shared by the page fetch and the webhook.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    retry: RetryPolicy,
}

impl HttpPageSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut retry = 0;

        loop {
            tracing::debug!("GET {} (attempt {})", url, retry + 1);
            match self.client.get(url).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    let body = response.text().await.map_err(|source| ScrapeError::FetchError {
                        url: url.to_string(),
                        source,
                    })?;
                    tracing::debug!("Fetched {} bytes from {}", body.len(), url);
                    return Ok(body);
                }
                Ok(response)
                    if self.retry.retries_status(response.status())
                        && retry < self.retry.max_retries =>
                {
                    retry += 1;
                    tracing::warn!(
                        "HTTP {} from {}; retry {}/{}",
                        response.status().as_u16(),
                        url,
                        retry,
                        self.retry.max_retries
                    );
                }
                Ok(response) => {
                    return Err(ScrapeError::HttpStatusError {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                    });
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && retry < self.retry.max_retries => {
                    retry += 1;
                    tracing::warn!(
                        "Request to {} failed: {}; retry {}/{}",
                        url,
                        e,
                        retry,
                        self.retry.max_retries
                    );
                }
                Err(source) => {
                    return Err(ScrapeError::FetchError {
                        url: url.to_string(),
                        source,
                    });
                }
            }

            sleep(self.retry.delay_for(retry)).await;
        }
    }
}
