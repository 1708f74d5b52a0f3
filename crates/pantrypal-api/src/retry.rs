// Retry plumbing for read requests that hit a flaky connection
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff policy for retried requests.
///
/// Only idempotent reads go through this; mutations are sent exactly once
/// so the caller can reason about rollback without wondering whether the
/// server saw the request twice.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl RetryConfig {
    /// Disable retries entirely.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay before the given retry attempt (0-based). Doubles per
    /// attempt, capped at `max_delay_ms`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        let ms = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

/// Run `operation` until it succeeds, the retry budget runs out, or it
/// fails with an error `is_retryable` rules out. A 401 or 404 surfaces
/// immediately; backing off on those would only delay the inevitable.
pub async fn with_retry<F, Fut, T, E, R>(
    config: &RetryConfig,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("request succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    debug!("request failed with non-retryable error: {}", err);
                    return Err(err);
                }
                if attempt >= config.max_retries {
                    warn!("request failed after {} attempts: {}", attempt + 1, err);
                    return Err(err);
                }

                let delay = config.delay_for(attempt);
                attempt += 1;
                warn!(
                    "request failed (attempt {}/{}): {}. retrying in {:?}",
                    attempt,
                    config.max_retries + 1,
                    err,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}

/// Whether an HTTP status is worth retrying: server errors, rate limits,
/// and timeouts. Client errors like 404 or 401 will not get better by asking
/// again.
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
}
