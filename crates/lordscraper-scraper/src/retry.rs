//! Bounded retry on request timeouts.
//!
//! Only transport timeouts are retried. Any other transport failure is
//! returned immediately; HTTP status codes are left for the classifier.

use std::future::Future;
use std::time::Duration;

use crate::client::RawResponse;
use crate::error::ScraperError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How many times to try a request and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Result of a retried request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Response(RawResponse),
    /// Every attempt timed out. Callers treat this as "nothing available".
    Exhausted,
}

/// Runs `operation` until it returns a response, fails with a non-timeout
/// error, or has timed out `policy.max_attempts` times.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] for the first transport error that is not
/// a timeout. Timeouts never surface as errors.
pub async fn fetch_with_retry<F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<Fetched, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RawResponse, reqwest::Error>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(response) => return Ok(Fetched::Response(response)),
            Err(err) if err.is_timeout() => {
                if attempt >= max_attempts {
                    tracing::error!(
                        attempt,
                        max_attempts,
                        error = %err,
                        "request timed out on every attempt, giving up"
                    );
                    return Ok(Fetched::Exhausted);
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(policy.delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "request timed out, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(ScraperError::Http(err)),
        }
    }
}
