//! Core HTTP operations with rate limiting and retry logic
//!
//! This module provides the GET operation used against the statistics API,
//! with rate limiting and exponential backoff on transient failures.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::constants::limits;
use crate::errors::{ApiError, ApiResult};

type DirectRateLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler with resilience patterns
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: DirectRateLimiter,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and retry policy
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidNumber` if the rate limit is zero
    pub fn new(
        client: Client,
        rate_limit_rps: u32,
        max_retries: u32,
        retry_base_delay: Duration,
    ) -> ApiResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
            max_retries,
            retry_base_delay,
        })
    }

    /// Builds the rate limiter with the specified rate limit
    fn build_rate_limiter(rate_limit_rps: u32) -> ApiResult<DirectRateLimiter> {
        let rate = NonZeroU32::new(rate_limit_rps).ok_or_else(|| ApiError::InvalidNumber {
            field: "rate_limit_rps",
            value: rate_limit_rps.to_string(),
        })?;
        Ok(RateLimiter::direct(Quota::per_second(rate)))
    }

    /// Backoff for the given attempt, with a little random jitter
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.retry_base_delay.as_millis() as u64 * 2_u64.pow(attempt);
        Duration::from_millis(base + fastrand::u64(0..=limits::RETRY_JITTER_MS))
    }

    /// Fetches a URL and returns the response body as text
    ///
    /// Retries on transport errors, HTTP 429 and HTTP 503. Any other non-success
    /// status is returned immediately as `ApiError::Status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails after retries or the status is not 2xx
    pub async fn get_text(&self, url: &Url) -> ApiResult<String> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let mut retries = 0;
        loop {
            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE
                    {
                        if retries < self.max_retries {
                            retries += 1;
                            let delay = self.backoff_delay(retries);
                            tracing::warn!(
                                "Server responded {} for {}. Backing off for {}ms",
                                status.as_u16(),
                                url,
                                delay.as_millis()
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                            ApiError::RateLimitExceeded
                        } else {
                            ApiError::ServerOverloaded
                        });
                    }

                    if !status.is_success() {
                        return Err(ApiError::Status {
                            status: status.as_u16(),
                        });
                    }

                    let body = response.text().await?;
                    tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    let delay = self.backoff_delay(retries);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        self.max_retries,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if self.max_retries == 0 => return Err(ApiError::Http(e)),
                Err(e) => {
                    tracing::error!("Request failed after {} retries: {}", self.max_retries, e);
                    return Err(ApiError::MaxRetriesExceeded {
                        max_retries: self.max_retries,
                    });
                }
            }
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
