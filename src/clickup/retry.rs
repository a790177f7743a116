use crate::clickup::types::ClickUpError;
use crate::env;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Attempt budget and timeout escalation for ClickUp calls.
///
/// Attempt `n` (0-based) runs with `base_timeout + n * timeout_step`, so the
/// defaults give 15s, 20s and 25s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_timeout: Duration,
    pub timeout_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: env::http::MAX_ATTEMPTS,
            base_timeout: Duration::from_secs(env::http::FETCH_TIMEOUT_SECS),
            timeout_step: Duration::from_secs(env::http::FETCH_TIMEOUT_STEP_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn timeout_for_attempt(&self, attempt: u32) -> Duration {
        self.base_timeout + self.timeout_step * attempt
    }

    fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn should_retry(&self, error: &ClickUpError, attempt: u32) -> bool {
        attempt < self.attempt_budget() && error.is_retryable()
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent. The operation receives the timeout for its attempt.
    pub async fn execute<F, Fut, T>(&self, target: &str, mut operation: F) -> Result<T, ClickUpError>
    where
        F: FnMut(Duration) -> Fut,
        Fut: Future<Output = Result<T, ClickUpError>>,
    {
        let budget = self.attempt_budget();
        let mut attempt = 0;

        loop {
            let timeout = self.timeout_for_attempt(attempt);
            debug!(
                "{}: attempt {}/{} (timeout: {:?})",
                target,
                attempt + 1,
                budget,
                timeout
            );

            match operation(timeout).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;

                    if self.should_retry(&err, attempt) {
                        warn!("{}: attempt {} failed: {}", target, attempt, err);
                        continue;
                    }

                    if err.is_retryable() {
                        error!("{}: giving up after {} attempts: {}", target, attempt, err);
                    } else {
                        error!("{}: {}", target, err);
                    }
                    return Err(err);
                }
            }
        }
    }
}
