//! Exponential backoff for transient failures.

use std::time::Duration;

use ferry_config::RetryConfig;

/// How many times, and how patiently, to resend a request that got no
/// response or a 5xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry. Retry `n` (zero-based) waits
    /// `base_delay * 2^n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_one_two_four_seconds() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (0..policy.max_retries)
            .map(|n| u64::try_from(policy.delay_for(n).as_millis()).unwrap())
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000]);
    }

    #[test]
    fn large_attempts_saturate() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(64),
            Duration::from_secs(u64::from(u32::MAX))
        );
    }

    #[test]
    fn built_from_config() {
        let config = RetryConfig {
            enabled: Some(true),
            max_retries: 5,
            base_delay_ms: 10,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
    }
}
