//! Retry policy configuration and backoff math.
//!
//! The policy is pure: it decides whether a labelled failure earns another
//! attempt and how long to wait before it. The adapter owns the sleeping.

use std::time::Duration;

use rand::Rng;

use crate::types::FailureLabel;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget (0-indexed attempts; `max_retries` attempts in all).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_backoff: Duration,
    /// Ceiling on any single backoff delay.
    pub max_backoff: Duration,
    /// Whether to add jitter to delays.
    pub use_jitter: bool,
    /// Maximum jitter fraction (0.0 to 1.0).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(30),
            use_jitter: false,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total attempt budget.
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base backoff interval.
    pub const fn with_base_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    /// Set the backoff ceiling.
    pub const fn with_max_backoff(mut self, ceiling: Duration) -> Self {
        self.max_backoff = ceiling;
        self
    }

    /// Enable or disable jitter.
    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Set jitter factor, clamped to 0.0..=1.0.
    pub const fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Whether a failure with `label` on 0-indexed attempt `attempt_index`
    /// earns another attempt.
    ///
    /// Non-retryable labels (`ClientError`, `Malformed`) never do, at any
    /// index; retryable labels do until the budget is spent.
    pub fn should_retry(&self, label: FailureLabel, attempt_index: u32) -> bool {
        label.is_retryable() && attempt_index < self.max_retries.saturating_sub(1)
    }

    /// Delay before the attempt after `attempt_index`.
    ///
    /// Exponential with base 2: `base_backoff * 2^attempt_index`, capped at
    /// `max_backoff`, then jittered when enabled.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        let exp = attempt_index.min(62);
        let base = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(exp))
            .min(self.max_backoff);

        if self.use_jitter {
            self.add_jitter(base)
        } else {
            base
        }
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_range = delay.as_millis() as f64 * self.jitter_factor;
        if jitter_range <= 0.0 {
            return delay;
        }
        let jitter = rng.gen_range(-jitter_range..=jitter_range);

        let with_jitter = delay.as_millis() as f64 + jitter;
        Duration::from_millis(with_jitter.max(0.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::new()
            .with_base_backoff(Duration::from_millis(1000))
            .with_jitter(false);

        assert_eq!(policy.backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(4000));
    }

    #[test]
    fn delay_respects_ceiling() {
        let policy = RetryPolicy::new()
            .with_base_backoff(Duration::from_secs(1))
            .with_max_backoff(Duration::from_secs(30))
            .with_jitter(false);

        // 1 * 2^10 = 1024s uncapped
        assert_eq!(policy.backoff_delay(10), Duration::from_secs(30));
        // Huge indices must not overflow
        assert_eq!(policy.backoff_delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn non_retryable_labels_never_retry() {
        let policy = RetryPolicy::new().with_max_retries(100);
        for attempt in 0..10 {
            assert!(!policy.should_retry(FailureLabel::ClientError, attempt));
            assert!(!policy.should_retry(FailureLabel::Malformed, attempt));
        }
    }

    #[test]
    fn retryable_labels_stop_at_budget() {
        let policy = RetryPolicy::new().with_max_retries(3);
        assert!(policy.should_retry(FailureLabel::ServerError, 0));
        assert!(policy.should_retry(FailureLabel::ServerError, 1));
        // attempt 2 is the third and last of a budget of 3
        assert!(!policy.should_retry(FailureLabel::ServerError, 2));
        assert!(!policy.should_retry(FailureLabel::Timeout, 5));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = RetryPolicy::new()
            .with_base_backoff(Duration::from_millis(1000))
            .with_jitter(true)
            .with_jitter_factor(0.1);

        for _ in 0..100 {
            let delay = policy.backoff_delay(0).as_millis();
            assert!((900..=1100).contains(&delay), "delay {delay} out of bounds");
        }
    }
}
