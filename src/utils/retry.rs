//! Retry utilities for the lookup loop
//!
//! The finder repeats a whole fetch-and-select cycle when no candidate
//! turns up, pausing between attempts. The pause goes through [`Backoff`]
//! so it can be swapped out (tests count the pauses instead of sleeping).

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Number of extra attempts after the first one
    pub max_retries: u32,

    /// Delay in milliseconds before the first retry
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps growth)
    pub max_delay_ms: u64,

    /// Multiplier applied per retry (1.0 keeps the delay fixed)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(2, Duration::from_secs(4))
    }
}

impl RetryConfig {
    /// Create a retry configuration with a constant delay between attempts
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self {
            max_retries,
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            backoff_multiplier: 1.0,
        }
    }

    /// Total number of attempts, first one included
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate the pause that precedes a given attempt (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let grown =
                self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
            (grown as u64).min(self.max_delay_ms)
        };

        Duration::from_millis(delay_ms)
    }
}

/// Pause between attempts
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Wait for `delay` before the next attempt
    async fn pause(&self, delay: Duration);
}

/// Default backoff sleeping on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackoff;

#[async_trait]
impl Backoff for TokioBackoff {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Run `operation` until it yields a value or the attempts run out
///
/// The operation receives the 0-based attempt index. On success the value is
/// returned together with the 1-based attempt number that produced it. The
/// backoff is invoked only between attempts, never after the last one.
///
/// # Example
///
/// ```no_run
/// use comment_finder::utils::retry::{retry_until_found, RetryConfig, TokioBackoff};
///
/// #[tokio::main]
/// async fn main() {
///     let config = RetryConfig::default();
///     let found = retry_until_found(&config, &TokioBackoff, |attempt| async move {
///         (attempt == 1).then_some("ready")
///     })
///     .await;
///     assert_eq!(found, Some(("ready", 2)));
/// }
/// ```
pub async fn retry_until_found<T, F, Fut>(
    config: &RetryConfig,
    backoff: &dyn Backoff,
    mut operation: F,
) -> Option<(T, u32)>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = config.calculate_delay(attempt);
            debug!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis(),
                "Retrying after delay"
            );
            backoff.pause(delay).await;
        }

        if let Some(value) = operation(attempt).await {
            if attempt > 0 {
                debug!(attempt = attempt + 1, "Succeeded after retry");
            }
            return Some((value, attempt + 1));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackoff {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Backoff for RecordingBackoff {
        async fn pause(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success_skips_backoff() {
        let config = RetryConfig::default();
        let backoff = RecordingBackoff::default();

        let result = retry_until_found(&config, &backoff, |_| async { Some(42) }).await;

        assert_eq!(result, Some((42, 1)));
        assert!(backoff.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_after_retries_reports_attempt() {
        let config = RetryConfig::default();
        let backoff = RecordingBackoff::default();
        let calls = AtomicU32::new(0);

        let result = retry_until_found(&config, &backoff, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { (attempt == 2).then_some("late") }
        })
        .await;

        assert_eq!(result, Some(("late", 3)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(backoff.delays.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_pauses_between_attempts_only() {
        let config = RetryConfig::fixed(2, Duration::from_secs(4));
        let backoff = RecordingBackoff::default();

        let result: Option<((), u32)> =
            retry_until_found(&config, &backoff, |_| async { None }).await;

        assert!(result.is_none());
        assert_eq!(
            *backoff.delays.lock().unwrap(),
            vec![Duration::from_secs(4), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn test_zero_retries_runs_once() {
        let config = RetryConfig::fixed(0, Duration::from_secs(4));
        let backoff = RecordingBackoff::default();
        let calls = AtomicU32::new(0);

        let result: Option<((), u32)> = retry_until_found(&config, &backoff, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { None }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(backoff.delays.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fixed_delay() {
        let config = RetryConfig::default();

        assert_eq!(config.total_attempts(), 3);
        assert_eq!(config.calculate_delay(0), Duration::from_millis(0));
        assert_eq!(config.calculate_delay(1), Duration::from_secs(4));
        assert_eq!(config.calculate_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_exponential_delay_cap() {
        let config = RetryConfig {
            max_retries: 10,
            base_delay_ms: 1000,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
        };

        assert_eq!(config.calculate_delay(1), Duration::from_millis(1000));
        assert_eq!(config.calculate_delay(3), Duration::from_millis(4000));
        assert_eq!(config.calculate_delay(10), Duration::from_millis(5000));
    }
}
