//! Rate-limit retry with exponential backoff and jitter

use super::types::ModelError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff before retry `n` (0-based) is `unit * base^n` plus up to one
/// `unit` of random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: 2,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget with no waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base: 2,
            unit: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        let backoff = self.unit.saturating_mul(self.base.saturating_pow(retry));
        if self.unit.is_zero() {
            return backoff;
        }
        let jitter = self.unit.mul_f64(rand::thread_rng().gen_range(0.0..1.0));
        backoff + jitter
    }

    /// Run `operation`, retrying only rate-limited failures.
    pub async fn run<T, F, Fut>(&self, provider: &str, mut operation: F) -> Result<T, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_rate_limited() => {
                    if attempt >= max_attempts {
                        return Err(ModelError::retries_exhausted(provider, max_attempts, err));
                    }
                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        provider,
                        next_attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited by provider, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
