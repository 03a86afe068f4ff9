//! Constant-delay retry for rate-limited isochrone requests.
//!
//! Only [`ServiceError::RateLimited`] is retried. Any other failure is
//! returned on the first attempt. The delay is fixed across attempts
//! (no exponential backoff).

use std::future::Future;
use std::time::Duration;

use isochrone_map_ors::ServiceError;
use isochrone_map_ors::config::RetryConfig;
use thiserror::Error;

/// Attempts made before giving up on a rate-limited request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wait after each rate-limited attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Retry budget for a single remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A budget of zero is raised to one attempt.
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
        }
    }

    /// Total attempts allowed.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fixed wait between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }
}

/// Why a retried call ultimately failed.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every attempt was rate limited.
    #[error("Gave up after {attempts} rate-limited attempt(s)")]
    ExhaustedRetries {
        /// Attempts made.
        attempts: u32,
    },

    /// A failure that is not a rate limit; never retried.
    #[error(transparent)]
    Request(#[from] ServiceError),
}

/// Runs `call`, waiting `policy.delay()` and trying again whenever it is
/// rate limited.
///
/// The wait happens only between attempts: `K` rate-limited attempts
/// followed by a success sleep exactly `K` times. No wait follows the
/// final attempt, so a call that is rate limited every time gives up after
/// `max_retries - 1` waits instead of sleeping once more before failing.
///
/// # Errors
///
/// Returns [`RetryError::ExhaustedRetries`] once `policy.max_retries()`
/// attempts have all been rate limited, or [`RetryError::Request`]
/// immediately for any other failure.
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let max_retries = policy.max_retries;

    for attempt in 1..=max_retries {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limited() => {
                if attempt < max_retries {
                    log::warn!(
                        "Rate limited: retry {attempt}/{} in {:?}...",
                        max_retries - 1,
                        policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(e) => return Err(RetryError::Request(e)),
        }
    }

    Err(RetryError::ExhaustedRetries {
        attempts: max_retries,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tokio::time::Instant;

    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    /// Paused-clock sleeps resolve on whole timer ticks, so compare with
    /// a margin far below one retry delay.
    fn assert_slept(start: Instant, sleeps: u32) {
        let elapsed = start.elapsed();
        let expected = DELAY * sleeps;
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_secs(1),
            "expected {sleeps} sleep(s), clock advanced {elapsed:?}"
        );
    }

    type Attempt = std::future::Ready<Result<&'static str, ServiceError>>;

    /// Returns a call that is rate limited `failures` times, then succeeds.
    fn flaky(failures: u32, calls: &Cell<u32>) -> impl FnMut() -> Attempt + '_ {
        move || {
            calls.set(calls.get() + 1);
            if calls.get() <= failures {
                std::future::ready(Err(ServiceError::RateLimited))
            } else {
                std::future::ready(Ok("ok"))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try_without_sleeping() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let result = execute(&RetryPolicy::new(3, DELAY), flaky(0, &calls)).await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.get(), 1);
        assert_slept(start, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_once_per_rate_limited_attempt() {
        for k in 1..3 {
            let calls = Cell::new(0);
            let start = Instant::now();
            let result = execute(&RetryPolicy::new(3, DELAY), flaky(k, &calls)).await;
            assert_eq!(result.unwrap(), "ok");
            assert_eq!(calls.get(), k + 1);
            assert_slept(start, k);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_retries_attempts() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let result = execute(&RetryPolicy::new(3, DELAY), flaky(u32::MAX, &calls)).await;
        assert!(matches!(
            result,
            Err(RetryError::ExhaustedRetries { attempts: 3 })
        ));
        assert_eq!(calls.get(), 3);
        assert_slept(start, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn other_failures_are_not_retried() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let result: Result<(), _> = execute(&RetryPolicy::default(), || {
            calls.set(calls.get() + 1);
            std::future::ready(Err(ServiceError::Unauthorized {
                status: 401,
                message: "bad key".to_string(),
            }))
        })
        .await;
        assert!(matches!(
            result,
            Err(RetryError::Request(ServiceError::Unauthorized { .. }))
        ));
        assert_eq!(calls.get(), 1);
        assert_slept(start, 0);
    }

    #[test]
    fn zero_budget_still_attempts_once() {
        assert_eq!(RetryPolicy::new(0, DELAY).max_retries(), 1);
    }

    #[test]
    fn policy_follows_service_config() {
        let config = RetryConfig {
            max_retries: 4,
            retry_delay_ms: 250,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries(), 4);
        assert_eq!(policy.delay(), Duration::from_millis(250));
    }
}
