//! Retry with exponential backoff for boundary mirror requests.
//!
//! [`run_with_policy`] wraps a fallible async request and retries transient
//! failures (timeouts, connection errors, 5xx, overload signals). Permanent
//! failures — malformed responses, 4xx — are returned immediately: retrying
//! bad input cannot help.

use std::future::Future;
use std::time::Duration;

use super::client::BoundaryError;

/// Retry schedule for a single mirror: attempt count, backoff shape,
/// and the per-attempt timeout. A plain value so failover logic can be
/// tested without any network.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// First backoff delay; doubles each retry
    pub base_delay: Duration,
    /// Backoff ceiling
    pub max_delay: Duration,
    /// Bound on any single request
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (1-based), doubling and capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt.saturating_sub(1)).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or exhausts the
/// policy's attempts. Returns the last error on exhaustion.
pub async fn run_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, BoundaryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BoundaryError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient boundary-service failure, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
