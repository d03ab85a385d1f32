//! Retry policy for external API requests.
//!
//! HTTP 429 responses back off linearly (`backoff * (attempt + 1)`), every
//! other retryable error waits the fixed `backoff`. A request is attempted at
//! most `max_retries + 1` times.

use crate::config::PipelineConfig;
use crate::jikan::ApiError;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub backoff: Duration,
}

/// Returned when a request never succeeded.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempt(s): {last}")]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last: ApiError,
}

impl RetryPolicy {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }

    /// Delay before retrying after `error` on the 0-based `attempt`.
    pub fn backoff_for(&self, error: &ApiError, attempt: u32) -> Duration {
        match error {
            ApiError::RateLimited => self.backoff.saturating_mul(attempt.saturating_add(1)),
            _ => self.backoff,
        }
    }

    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

/// Runs `action` until it succeeds or the policy gives up.
///
/// `action` receives the 0-based attempt number.
pub fn retry_with_backoff<T, F>(policy: &RetryPolicy, mut action: F) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Result<T, ApiError>,
{
    let mut attempt = 0;
    loop {
        match action(attempt) {
            Ok(value) => return Ok(value),
            Err(error) if policy.should_retry(&error, attempt) => {
                let delay = policy.backoff_for(&error, attempt);
                warn!(
                    "Request failed ({}), retrying in {:?} (attempt {}/{})",
                    error,
                    delay,
                    attempt + 1,
                    policy.max_retries + 1
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                attempt += 1;
            }
            Err(error) => {
                return Err(RetryExhausted {
                    attempts: attempt + 1,
                    last: error,
                })
            }
        }
    }
}
