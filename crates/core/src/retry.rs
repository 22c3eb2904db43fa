//! Retry logic with exponential backoff
//!
//! Provides the retry primitives used by the API client:
//! - Exponential backoff: `base_delay * 2^(n-1)` before the n-th retry
//! - A pluggable "is this failure retryable" predicate
//! - An immutable [`Attempt`] counter threaded through the retry loop
//!
//! No jitter is applied, so correlated failures retry in lockstep.
//!
//! # Example
//!
//! ```rust,no_run
//! use magicsaas_core::retry::{retry_async, RetryConfig};
//!
//! # async fn run() {
//! let result = retry_async(&RetryConfig::default(), |_err: &&str| true, |_attempt| async {
//!     Ok::<_, &str>("success")
//! })
//! .await;
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of retries after the first attempt
    pub retry_attempts: u32,
    /// Delay before the first retry; doubles for each following retry
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Create a config with the given retry budget and base delay
    pub fn new(retry_attempts: u32, base_delay: Duration) -> Self {
        Self {
            retry_attempts,
            base_delay,
        }
    }

    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Total number of attempts, first one included
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }

    /// Whether another retry may follow a failed `attempt`
    pub fn allows_retry(&self, attempt: Attempt) -> bool {
        attempt.retries_used() < self.retry_attempts
    }

    /// Delay before the `retry`-th retry (1-based); zero for `retry == 0`.
    /// Uncapped: `base_delay * 2^(retry-1)`, saturating on overflow.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.checked_pow(retry - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Position in a retry sequence.
///
/// Values are only created by [`Attempt::first`] and [`Attempt::next`], so
/// the count can never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    number: u32,
}

impl Attempt {
    /// The initial, non-retry attempt
    pub const fn first() -> Self {
        Self { number: 1 }
    }

    /// The attempt following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            number: self.number + 1,
        }
    }

    /// 1-based attempt number
    pub const fn number(self) -> u32 {
        self.number
    }

    /// Retries already consumed before this attempt
    pub const fn retries_used(self) -> u32 {
        self.number - 1
    }

    /// Whether this is a retry rather than the first attempt
    pub const fn is_retry(self) -> bool {
        self.number > 1
    }
}

/// Retry result with attempt information
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub value: T,
    /// Number of attempts made
    pub attempts: u32,
    /// Total time spent, delays included
    pub total_duration: Duration,
}

/// Run `op` until it succeeds, `should_retry` rejects the failure, or the
/// retry budget is spent. The last error is returned unchanged.
pub async fn retry_async<T, E, F, Fut, P>(
    config: &RetryConfig,
    mut should_retry: P,
    mut op: F,
) -> Result<RetryResult<T>, E>
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
{
    let start = Instant::now();
    let mut attempt = Attempt::first();

    loop {
        match op(attempt).await {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: attempt.number(),
                    total_duration: start.elapsed(),
                });
            }
            Err(e) => {
                if !config.allows_retry(attempt) || !should_retry(&e) {
                    return Err(e);
                }

                let next = attempt.next();
                let delay = config.delay_for_retry(next.retries_used());
                debug!(
                    attempt = next.number(),
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
                attempt = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig::new(5, Duration::from_millis(100));

        assert_eq!(config.delay_for_retry(0), Duration::ZERO);
        assert_eq!(config.delay_for_retry(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_retry(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_retry(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_uncapped() {
        let config = RetryConfig::new(20, Duration::from_millis(100));

        assert_eq!(config.delay_for_retry(11), Duration::from_millis(102_400));
        assert_eq!(config.delay_for_retry(20), Duration::from_millis(100 * (1 << 19)));
    }

    #[test]
    fn test_serialized_fields() {
        let value = serde_json::to_value(RetryConfig::new(3, Duration::from_secs(1))).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(keys, vec!["base_delay", "retry_attempts"]);
    }

    #[test]
    fn test_attempt_budget() {
        let config = RetryConfig::new(2, Duration::ZERO);
        let first = Attempt::first();

        assert_eq!(config.max_attempts(), 3);
        assert!(config.allows_retry(first));
        assert!(config.allows_retry(first.next()));
        assert!(!config.allows_retry(first.next().next()));
        assert!(!RetryConfig::no_retry().allows_retry(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures() {
        let config = RetryConfig::new(3, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result = retry_async(&config, |_: &&str| true, move |attempt| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt.number() < 3 {
                    Err("not yet")
                } else {
                    Ok("success")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.value, "success");
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_budget_with_exponential_delays() {
        let config = RetryConfig::new(3, Duration::from_millis(100));
        let calls = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let counter = calls.clone();
        let result = retry_async(&config, |_: &&str| true, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("always fails") }
        })
        .await;

        assert_eq!(result.unwrap_err(), "always fails");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 100 + 200 + 400
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let config = RetryConfig::new(3, Duration::from_millis(100));
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result = retry_async(&config, |e: &u16| *e >= 500, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(404u16) }
        })
        .await;

        assert_eq!(result.unwrap_err(), 404);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    proptest! {
        #[test]
        fn prop_delay_doubles(base_ms in 1u64..5_000, retry in 1u32..12) {
            let config = RetryConfig::new(retry + 1, Duration::from_millis(base_ms));
            let expected = Duration::from_millis(base_ms * 2u64.pow(retry - 1));
            prop_assert_eq!(config.delay_for_retry(retry), expected);
            prop_assert_eq!(config.delay_for_retry(retry + 1), expected * 2);
        }
    }
}
