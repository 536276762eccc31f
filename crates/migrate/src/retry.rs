//! Exponential-backoff retry policy for migration units.
//!
//! Each unit gets a bounded attempt budget; between failed attempts the
//! executor sleeps with a growing, clamped delay. A per-attempt timeout
//! bounds how long a single `apply` call may run and counts against the
//! same budget.

use std::time::Duration;

/// Tunable parameters for per-unit retry.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Total attempts per unit, including the first.
    pub max_attempts: u32,
    /// Upper bound on a single `apply` call.
    pub unit_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 3,
            unit_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default |
    /// |----------------------------------|---------|
    /// | `DBSHIFT_RETRY_INITIAL_DELAY_MS` | `1000`  |
    /// | `DBSHIFT_RETRY_MAX_DELAY_MS`     | `30000` |
    /// | `DBSHIFT_RETRY_MAX_ATTEMPTS`     | `3`     |
    /// | `DBSHIFT_UNIT_TIMEOUT_SECS`      | `60`    |
    pub fn from_env() -> Self {
        let initial_ms: u64 = std::env::var("DBSHIFT_RETRY_INITIAL_DELAY_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("DBSHIFT_RETRY_INITIAL_DELAY_MS must be a valid u64");

        let max_ms: u64 = std::env::var("DBSHIFT_RETRY_MAX_DELAY_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .expect("DBSHIFT_RETRY_MAX_DELAY_MS must be a valid u64");

        let max_attempts: u32 = std::env::var("DBSHIFT_RETRY_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("DBSHIFT_RETRY_MAX_ATTEMPTS must be a valid u32");

        let unit_timeout_secs: u64 = std::env::var("DBSHIFT_UNIT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("DBSHIFT_UNIT_TIMEOUT_SECS must be a valid u64");

        Self {
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            max_attempts,
            unit_timeout: Duration::from_secs(unit_timeout_secs),
            ..Default::default()
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let config = RetryConfig::default();
        let d = next_delay(Duration::from_secs(1), &config);
        assert_eq!(d, Duration::from_secs(2));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        let d = next_delay(Duration::from_secs(8), &config);
        assert_eq!(d, Duration::from_secs(10));
    }

    #[test]
    fn next_delay_already_at_max() {
        let config = RetryConfig::default();
        let d = next_delay(Duration::from_secs(30), &config);
        assert_eq!(d, Duration::from_secs(30));
    }

    #[test]
    fn custom_multiplier() {
        let config = RetryConfig {
            multiplier: 3.0,
            max_delay: Duration::from_secs(60),
            ..Default::default()
        };
        let d = next_delay(Duration::from_secs(2), &config);
        assert_eq!(d, Duration::from_secs(6));
    }

    #[test]
    fn full_backoff_sequence() {
        let config = RetryConfig::default();
        let mut delay = config.initial_delay;
        let expected = [1, 2, 4, 8, 16, 30, 30, 30];

        for &expected_secs in &expected {
            assert_eq!(delay.as_secs(), expected_secs);
            delay = next_delay(delay, &config);
        }
    }

    #[test]
    fn default_attempt_budget_is_three() {
        assert_eq!(RetryConfig::default().max_attempts, 3);
    }
}
