//! Bounded retry for model calls
//!
//! Model calls fail two retryable ways: rate limiting and malformed
//! replies. Both are worth re-attempting at temperature zero only because
//! providers are not fully deterministic. Everything else fails the run
//! immediately.

use crate::error::ExtractError;
use std::time::Duration;
use tracing::warn;

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy with `max_attempts` total attempts and a fixed `delay`
    /// between them. `max_attempts` of zero is treated as one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }

    /// Run `op` until it succeeds, fails non-retryably, or the attempt
    /// budget runs out. Exhaustion wraps the final error in
    /// [`ExtractError::RetriesExhausted`].
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, ExtractError>
    where
        F: FnMut() -> Result<T, ExtractError>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        operation = what,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "model call failed, retrying"
                    );
                    std::thread::sleep(self.delay);
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    return Err(ExtractError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_llm::LlmError;

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn test_success_first_try() {
        let mut calls = 0;
        let result = policy(5).run("op", || {
            calls += 1;
            Ok::<_, ExtractError>(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retryable_error_is_retried_until_success() {
        let mut calls = 0;
        let result = policy(5).run("op", || {
            calls += 1;
            if calls < 3 {
                Err(ExtractError::MalformedReply("bad".into()))
            } else {
                Ok(7)
            }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_budget_exhaustion_wraps_last_error() {
        let mut calls = 0;
        let result: Result<(), _> = policy(5).run("op", || {
            calls += 1;
            Err(ExtractError::Llm(LlmError::RateLimited))
        });
        assert_eq!(calls, 5);
        match result {
            Err(ExtractError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, ExtractError::Llm(LlmError::RateLimited)));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_non_retryable_error_fails_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = policy(5).run("op", || {
            calls += 1;
            Err(ExtractError::Llm(LlmError::Communication("down".into())))
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ExtractError::Llm(LlmError::Communication(_)))));
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let mut calls = 0;
        let result: Result<(), _> = policy(0).run("op", || {
            calls += 1;
            Err(ExtractError::MalformedReply("bad".into()))
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ExtractError::RetriesExhausted { attempts: 1, .. })));
    }
}
