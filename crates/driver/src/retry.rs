use crate::error::QueryError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Largest doubling exponent applied to `base_delay`.
const MAX_BACKOFF_SHIFT: u32 = 6;

/// Exponential backoff for requests that fail with a transient error
/// (`Unavailable`, `Timeout`, `Overloaded`). Anything else is returned
/// after the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// Runs `send` until it succeeds, fails permanently, or runs out of
    /// attempts. `send` receives the zero based attempt index.
    pub async fn run<F, Fut, T>(&self, mut send: F) -> Result<T, QueryError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match send(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_transient() || attempt + 1 >= self.max_attempts {
                return Err(err);
            }

            sleep(self.backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// `base_delay * 2^attempt`, capped at `max_delay`.
    fn backoff_delay(&self, attempt: usize) -> Duration {
        let shift = (attempt as u32).min(MAX_BACKOFF_SHIFT);
        self.base_delay
            .saturating_mul(1 << shift)
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let calls = &AtomicUsize::new(0);
        let result = fast(3)
            .run(move |_| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(QueryError::Timeout("slow".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_stop_immediately() {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), _> = fast(5)
            .run(move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(QueryError::InvalidQuery("no such table".into()))
            })
            .await;

        assert!(matches!(result, Err(QueryError::InvalidQuery(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_transient_error_is_returned() {
        let attempts = &AtomicUsize::new(0);
        let result: Result<(), _> = fast(2)
            .run(move |attempt| async move {
                attempts.store(attempt + 1, Ordering::SeqCst);
                Err(QueryError::Overloaded(format!("busy {attempt}")))
            })
            .await;

        assert!(matches!(result, Err(QueryError::Overloaded(msg)) if msg == "busy 1"));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_millis(50), Duration::from_millis(300));
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(50));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(5), Duration::from_millis(300));
        assert_eq!(policy.backoff_delay(usize::MAX), Duration::from_millis(300));
    }

    #[test]
    fn test_max_delay_never_below_base() {
        let policy = RetryPolicy::new(0, Duration::from_millis(40), Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(40));
    }
}
