//! Retry with exponential backoff for remote calls.

use std::thread;
use std::time::Duration;

use crate::errors::{Result, SyncError};

/// Backoff policy: up to `max_attempts` tries, sleeping
/// `base_delay * 2^attempt` between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy without sleeps, for tests.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }
}

/// Returns `true` for failures worth retrying: transport-level HTTP
/// errors, rate limiting (429), and server errors (5xx). Everything else,
/// including 4xx client errors, propagates immediately.
#[must_use]
pub fn is_retryable(error: &SyncError) -> bool {
    match error {
        SyncError::Http { status, .. } => match status {
            None => true,
            Some(429) => true,
            Some(code) => *code >= 500,
        },
        _ => false,
    }
}

/// Run `op` until it succeeds, retries are exhausted, or it fails with a
/// non-retryable error.
pub fn with_retry<T>(policy: &RetryPolicy, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) if attempt + 1 < policy.max_attempts && is_retryable(&error) => {
                let delay = policy.base_delay * 2u32.saturating_pow(attempt);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_error() -> SyncError {
        SyncError::Http {
            status: None,
            message: "connection reset".to_string(),
        }
    }

    fn status_error(status: u16) -> SyncError {
        SyncError::Http {
            status: Some(status),
            message: format!("status {status}"),
        }
    }

    #[test]
    fn succeeds_first_try_without_retrying() {
        let mut calls = 0;
        let result = with_retry(&RetryPolicy::immediate(3), || {
            calls += 1;
            Ok(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_transport_errors_until_success() {
        let mut calls = 0;
        let result = with_retry(&RetryPolicy::immediate(3), || {
            calls += 1;
            if calls < 3 {
                Err(transport_error())
            } else {
                Ok("ok")
            }
        });
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<()> = with_retry(&RetryPolicy::immediate(3), || {
            calls += 1;
            Err(status_error(503))
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<()> = with_retry(&RetryPolicy::immediate(3), || {
            calls += 1;
            Err(status_error(404))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn non_http_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<()> = with_retry(&RetryPolicy::immediate(3), || {
            calls += 1;
            Err(SyncError::Inventory {
                message: "spawn failed".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn retryable_classification() {
        assert!(is_retryable(&transport_error()));
        assert!(is_retryable(&status_error(429)));
        assert!(is_retryable(&status_error(500)));
        assert!(is_retryable(&status_error(503)));
        assert!(!is_retryable(&status_error(401)));
        assert!(!is_retryable(&status_error(404)));
        assert!(!is_retryable(&SyncError::Credential {
            message: "no token".to_string(),
        }));
    }
}
