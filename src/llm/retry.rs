use crate::error::RATE_LIMIT_RETRY_AFTER_SECS;
use async_trait::async_trait;
use std::time::Duration;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed wait after a rate-limited attempt
    pub rate_limit_backoff: Duration,
    /// Linear step for transport failures: attempt `n` waits `step * (n + 1)`
    pub connection_backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_backoff: Duration::from_secs(RATE_LIMIT_RETRY_AFTER_SECS),
            connection_backoff_step: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn connection_backoff(&self, attempt: u32) -> Duration {
        self.connection_backoff_step * (attempt + 1)
    }

    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// Waits between attempts. Swapped out in tests so no real time passes.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
