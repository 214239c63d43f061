//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::clients::errors::{FailureKind, RequestError};
use crate::clients::http_request::HttpMethod;
use crate::config::PowoConfig;

/// Upper bound of the random jitter added to computed backoff, in seconds.
pub const MAX_JITTER_SECS: f64 = 0.25;

/// Retries rate-limited and server-error failures.
///
/// An operation is attempted at most `max_retries + 1` times. Before each
/// retry the policy sleeps for the server's `Retry-After` value when a
/// rate-limited response carries one, otherwise for
/// `backoff_base * 2^(attempt - 1)` plus up to 0.25 s of jitter, capped at
/// `backoff_max`. Every other failure kind is returned immediately.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use powo_api::{HttpMethod, RetryPolicy};
///
/// let policy = RetryPolicy::new(true, 2, Duration::from_millis(200), Duration::from_secs(2));
/// let json = policy
///     .with_retry(HttpMethod::Get, &url, || send_once(&url))
///     .await?;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    enabled: bool,
    max_retries: u32,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(
        enabled: bool,
        max_retries: u32,
        backoff_base: Duration,
        backoff_max: Duration,
    ) -> Self {
        Self {
            enabled,
            max_retries,
            backoff_base,
            backoff_max,
        }
    }

    /// Creates a policy from the retry settings of `config`.
    #[must_use]
    pub const fn from_config(config: &PowoConfig) -> Self {
        Self::new(
            config.retries(),
            config.max_retries(),
            config.backoff_base(),
            config.backoff_max(),
        )
    }

    /// Returns the total number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Runs `operation` until it succeeds, fails terminally, or attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the last failure unchanged once it is not retryable or the
    /// attempt ceiling is reached.
    pub async fn with_retry<F, Fut, T>(
        &self,
        method: HttpMethod,
        url: &str,
        mut operation: F,
    ) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt: u32 = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !self.enabled || !error.is_retryable() || attempt >= max_attempts {
                        return Err(error);
                    }

                    let delay = self.delay_for(&error, attempt);
                    tracing::warn!(
                        "Retrying {} {} in {:.2}s (attempt {}/{})",
                        method,
                        url,
                        delay.as_secs_f64(),
                        attempt + 1,
                        max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Computes the sleep before the retry that follows `attempt`.
    #[must_use]
    pub fn delay_for(&self, error: &RequestError, attempt: u32) -> Duration {
        if error.kind == FailureKind::RateLimited {
            if let Some(secs) = error.retry_after() {
                return Duration::try_from_secs_f64(secs).unwrap_or(self.backoff_max);
            }
        }
        let jitter = rand::thread_rng().gen_range(0.0..MAX_JITTER_SECS);
        self.backoff(attempt, jitter)
    }

    /// Exponential backoff for `attempt` with a given jitter, capped at `backoff_max`.
    #[must_use]
    pub fn backoff(&self, attempt: u32, jitter_secs: f64) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.backoff_base.as_secs_f64().mul_add(2f64.powi(exponent), jitter_secs);
        let max = self.backoff_max.as_secs_f64();
        Duration::try_from_secs_f64(secs.min(max)).unwrap_or(self.backoff_max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            true,
            crate::config::DEFAULT_MAX_RETRIES,
            crate::config::DEFAULT_BACKOFF_BASE,
            crate::config::DEFAULT_BACKOFF_MAX,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    const URL: &str = "https://example.test/api/2/search";

    fn failure(kind: FailureKind, retry_after: Option<&str>) -> RequestError {
        let mut headers = HashMap::new();
        if let Some(value) = retry_after {
            headers.insert("retry-after".to_string(), vec![value.to_string()]);
        }
        RequestError {
            kind,
            message: kind.to_string(),
            status: None,
            method: HttpMethod::Get,
            url: URL.to_string(),
            body: None,
            headers,
        }
    }

    fn no_sleep(enabled: bool, max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(enabled, max_retries, Duration::ZERO, Duration::ZERO)
    }

    async fn run(
        policy: RetryPolicy,
        script: Vec<Result<Value, RequestError>>,
    ) -> (Result<Value, RequestError>, u32) {
        let calls = AtomicU32::new(0);
        let result = policy
            .with_retry(HttpMethod::Get, URL, || {
                let index = calls.fetch_add(1, Ordering::SeqCst) as usize;
                let outcome = script[index.min(script.len() - 1)].clone();
                async move { outcome }
            })
            .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_disabled_retries_fail_on_first_server_error() {
        let (result, calls) = run(
            no_sleep(false, 3),
            vec![Err(failure(FailureKind::ServerError, None))],
        )
        .await;
        assert_eq!(result.unwrap_err().kind, FailureKind::ServerError);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_one_retry_recovers_from_single_failure() {
        let (result, calls) = run(
            no_sleep(true, 1),
            vec![Err(failure(FailureKind::ServerError, None)), Ok(json!({"ok": true}))],
        )
        .await;
        assert_eq!(result.unwrap(), json!({"ok": true}));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries_plus_one() {
        let (result, calls) = run(
            no_sleep(true, 2),
            vec![Err(failure(FailureKind::RateLimited, None))],
        )
        .await;
        assert_eq!(result.unwrap_err().kind, FailureKind::RateLimited);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_terminal_kinds_are_never_retried() {
        for kind in [
            FailureKind::ClientError,
            FailureKind::ParseError,
            FailureKind::Timeout,
            FailureKind::ConnectionFailed,
        ] {
            let (result, calls) = run(no_sleep(true, 3), vec![Err(failure(kind, None))]).await;
            assert_eq!(result.unwrap_err().kind, kind);
            assert_eq!(calls, 1, "{kind} should not be retried");
        }
    }

    #[test]
    fn test_retry_after_takes_precedence_over_backoff() {
        let policy = RetryPolicy::new(true, 3, Duration::from_secs(1), Duration::from_secs(2));
        let error = failure(FailureKind::RateLimited, Some("7"));
        // Retry-After is used verbatim, even above backoff_max.
        assert_eq!(policy.delay_for(&error, 1), Duration::from_secs(7));
    }

    #[test]
    fn test_retry_after_ignored_for_server_errors() {
        let policy = RetryPolicy::new(true, 3, Duration::ZERO, Duration::ZERO);
        let error = failure(FailureKind::ServerError, Some("7"));
        assert_eq!(policy.delay_for(&error, 1), Duration::ZERO);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(true, 5, Duration::from_millis(500), Duration::from_secs(3));
        assert_eq!(policy.backoff(1, 0.0), Duration::from_millis(500));
        assert_eq!(policy.backoff(2, 0.0), Duration::from_secs(1));
        assert_eq!(policy.backoff(3, 0.0), Duration::from_secs(2));
        assert_eq!(policy.backoff(4, 0.0), Duration::from_secs(3));
        assert_eq!(policy.backoff(2, 0.25), Duration::from_millis(1250));
    }

    #[test]
    fn test_computed_delay_stays_within_jitter_window() {
        let policy = RetryPolicy::new(true, 3, Duration::from_secs(1), Duration::from_secs(10));
        let error = failure(FailureKind::ServerError, None);
        for _ in 0..50 {
            let delay = policy.delay_for(&error, 1).as_secs_f64();
            assert!((1.0..1.25).contains(&delay), "delay {delay} out of range");
        }
    }

    #[test]
    fn test_max_attempts() {
        assert_eq!(no_sleep(true, 0).max_attempts(), 1);
        assert_eq!(no_sleep(true, 3).max_attempts(), 4);
        assert_eq!(no_sleep(true, u32::MAX).max_attempts(), u32::MAX);
    }
}
