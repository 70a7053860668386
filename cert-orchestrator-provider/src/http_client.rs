//! Generic HTTP client tools
//!
//! Shared request execution for the providers. Each provider builds its own
//! `RequestBuilder` (authentication schemes differ too much to unify), this
//! module sends it, logs it, classifies transport failures and retries the
//! transient ones.
//!
//! Requests are produced by a closure rather than cloned so that signed
//! requests (AWS `SigV4`) get a fresh timestamp and signature on every attempt.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ProviderError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Status code and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Whether the status is 2xx.
    #[cfg(feature = "acm")]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Sends one request and returns its status and body.
    ///
    /// HTTP 429 becomes [`ProviderError::RateLimited`] and 502–504 become
    /// [`ProviderError::NetworkError`]; every other status is returned to the caller,
    /// which owns the provider-specific error body format.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        action: &str,
    ) -> Result<RawResponse> {
        log::debug!("[{provider_name}] {action}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[{provider_name}] {action} -> HTTP {status}");

        // Read Retry-After before the body consumes the response
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Server error (HTTP {status})");
            return Err(ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&body)
        );

        Ok(RawResponse { status, body })
    }

    /// Builds and sends a request, retrying transient failures.
    ///
    /// `build` is called once per attempt. Only [`is_retryable`] errors are
    /// retried, with exponential backoff (100ms, 200ms, 400ms, ... capped at 10s)
    /// or the server's `Retry-After` (capped at 30s).
    pub async fn execute_with_retry<F>(
        build: F,
        provider_name: &str,
        action: &str,
        max_retries: u32,
    ) -> Result<RawResponse>
    where
        F: Fn() -> Result<RequestBuilder>,
    {
        let mut attempt = 0;
        loop {
            match Self::execute_request(build()?, provider_name, action).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && is_retryable(&e) => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        provider_name,
                        action,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Parse JSON response
    pub fn parse_json<T>(body: &str, provider_name: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!("[{provider_name}] JSON parse failed: {e}");
            log::error!("[{provider_name}] Raw response: {}", truncate_for_log(body));
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

/// Determine whether the error can be retried
///
/// Network errors, timeouts and rate limiting are transient; business errors
/// (bad credentials, invalid parameters, ...) are returned immediately.
pub(crate) fn is_retryable(error: &ProviderError) -> bool {
    matches!(
        error,
        ProviderError::NetworkError { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::RateLimited { .. }
    )
}

/// `Retry-After` (capped at 30s) when rate limited, exponential backoff otherwise.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, 800ms, 1.6s, ... capped at 10s
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // 2^attempt overflow
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(10_000))
}
