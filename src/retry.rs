use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff settings for retried operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included (treated as at least 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Factor applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset: sheet exports (3 attempts)
    /// Delays: 500ms, 1s
    pub fn sheet_fetch() -> Self {
        Self::new(3, Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(4))
            .with_backoff_multiplier(2.0)
    }

    /// Preset: a single attempt, no retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait before `attempt` (0-indexed)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::sheet_fetch()
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or runs out of attempts. Returns the last error on failure.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!(
                "{}: Retry attempt {}/{} after {:?}",
                operation_name,
                attempt + 1,
                max_attempts,
                delay
            );
            sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name,
                        attempt + 1,
                        max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    debug!("{}: Not retryable, giving up: {}", operation_name, e);
                    return Err(e);
                }

                let remaining = max_attempts - attempt - 1;
                if remaining == 0 {
                    warn!(
                        "{}: All {} attempts failed. Last error: {}",
                        operation_name, max_attempts, e
                    );
                    return Err(e);
                }

                warn!(
                    "{}: Attempt {}/{} failed ({}), {} retries remaining",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    e,
                    remaining
                );
                attempt += 1;
            }
        }
    }
}
