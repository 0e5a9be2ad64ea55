//! Retry logic with exponential backoff
//!
//! Every network call goes through [`with_retry`]. The delay before retry `k` is
//! `unit * 2^k` plus up to one `unit` of random jitter, so parallel callers that fail
//! together do not retry in lockstep.
//!
//! # Example
//!
//! ```no_run
//! use booru_rank_dl::retry::{IsRetryable, with_retry};
//! use booru_rank_dl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, 5xx) should return `true`.
/// Permanent failures (404, malformed markup, disk errors) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            Error::Timeout { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Already exhausted its own retry budget
            Error::Fetch { .. } => false,
            Error::Malformed(_) => false,
            Error::InvalidUrl(_) => false,
            Error::Serialization(_) => false,
            Error::Config { .. } => false,
            Error::InvalidArgument(_) => false,
        }
    }
}

/// Server-side and throttling statuses are worth another attempt; other client errors are not
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

/// Execute an async operation, retrying transient failures with exponential backoff
///
/// Returns the successful result or the last error once `config.max_retries`
/// additional attempts have been used up.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                attempt += 1;
                let delay = backoff_delay(config, attempt);

                tracing::debug!(
                    error = %e,
                    attempt = attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::debug!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::debug!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Delay before retry `attempt` (1-indexed)
///
/// `unit * 2^attempt`, plus `unit * U[0, 1)` when jitter is enabled, capped at `max_delay`.
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponent = attempt.min(30) as i32;
    let floor = config.unit.as_secs_f64() * 2f64.powi(exponent);
    let jitter = if config.jitter {
        config.unit.as_secs_f64() * rand::thread_rng().gen_range(0.0..1.0)
    } else {
        0.0
    };
    Duration::from_secs_f64(floor + jitter).min(config.max_delay)
}
