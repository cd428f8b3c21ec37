//! Retry mechanism for handling transient failures in async operations.
//!
//! Provides a configurable retry helper with exponential backoff. The caller
//! supplies a predicate deciding which errors are worth retrying, so fatal
//! classifications propagate immediately.

use std::time::Duration;

/// Configuration for retry behavior
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,

    /// Initial delay between attempts, doubled after each failure
    pub initial_delay: Duration,

    /// Upper bound the exponential backoff will not exceed
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Handler for retrying operations with exponential backoff
pub struct WithRetry {
    config: RetryConfig,
}

impl WithRetry {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self {
            config: RetryConfig::default(),
        }
    }

    /// Attempts an async operation, retrying while `should_retry` accepts the
    /// error and attempts remain
    ///
    /// The delay between attempts doubles each time, capped at the configured
    /// maximum delay.
    pub async fn attempt<F, Fut, T, E, R>(&self, operation: F, should_retry: R) -> Result<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<T, E>> + Send,
        T: Send,
        E: std::fmt::Debug + Send,
        R: Fn(&E) -> bool + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.config.max_attempts || !should_retry(&e) {
                        return Err(e);
                    }

                    let delay =
                        (self.config.initial_delay.as_millis() * (1 << (attempt - 1))) as u64;
                    let delay =
                        Duration::from_millis(delay.min(self.config.max_delay.as_millis() as u64));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Doubles a backoff delay, bounded by `max`
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    (current * 2).min(max)
}
