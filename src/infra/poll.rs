//! Bounded result polling
//!
//! The DOV facial-match session completes out of band (the consumer follows
//! an SMS link), so the bridge polls the upstream service for a result:
//! fixed attempt budget, fixed sleep interval, stop at the first conclusive
//! response. Transport errors count as "no result yet" and are retried.

use std::future::Future;
use std::time::Duration;

/// Configuration for polling behavior
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Sleep interval between attempts
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(10),
        }
    }
}

impl PollConfig {
    /// Create a config for fast polling (used in tests)
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            interval: Duration::from_millis(10),
        }
    }

    /// Set the attempt budget
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the sleep interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Outcome of a polling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A conclusive response arrived within the attempt budget
    Conclusive(T),
    /// The attempt budget was exhausted without a conclusive response
    TimedOut,
}

impl<T> PollOutcome<T> {
    /// Check if the poll produced a conclusive response
    pub fn is_conclusive(&self) -> bool {
        matches!(self, PollOutcome::Conclusive(_))
    }

    /// Get the conclusive value, if any
    pub fn into_conclusive(self) -> Option<T> {
        match self {
            PollOutcome::Conclusive(value) => Some(value),
            PollOutcome::TimedOut => None,
        }
    }
}

/// Result of a polling run
#[derive(Debug)]
pub struct PollResult<T> {
    /// The final outcome
    pub outcome: PollOutcome<T>,
    /// Number of attempts made (1 = conclusive on first try)
    pub attempts: u32,
    /// Total time spent polling (including sleeps)
    pub total_duration: Duration,
}

/// A poller that runs an operation until it yields a conclusive response
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    /// Create a new poller with the given config
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Run an operation until `is_conclusive` accepts its output or the
    /// attempt budget is exhausted.
    ///
    /// Operation errors are logged and treated as inconclusive attempts.
    pub async fn run<F, Fut, T, E, P>(&self, operation: F, is_conclusive: P) -> PollResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&T) -> bool,
    {
        let start = std::time::Instant::now();
        let mut attempts = 0;

        while attempts < self.config.max_attempts {
            attempts += 1;

            match operation().await {
                Ok(value) if is_conclusive(&value) => {
                    tracing::info!(attempt = attempts, "Poll returned a conclusive response");
                    return PollResult {
                        outcome: PollOutcome::Conclusive(value),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }
                Ok(_) => {
                    tracing::debug!(
                        attempt = attempts,
                        max_attempts = self.config.max_attempts,
                        interval_ms = self.config.interval.as_millis(),
                        "No result yet, will poll again"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempts,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "Poll attempt failed, treating as no result"
                    );
                }
            }

            if attempts < self.config.max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        tracing::warn!(
            attempts,
            duration_ms = start.elapsed().as_millis(),
            "Polling timed out after exhausting the attempt budget"
        );

        PollResult {
            outcome: PollOutcome::TimedOut,
            attempts,
            total_duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_poll_conclusive_first_try() {
        let poller = Poller::new(PollConfig::fast());

        let result = poller
            .run(|| async { Ok::<_, &str>("done") }, |v| !v.is_empty())
            .await;

        assert!(result.outcome.is_conclusive());
        assert_eq!(result.attempts, 1);
        assert_eq!(result.outcome.into_conclusive().unwrap(), "done");
    }

    #[tokio::test]
    async fn test_poll_returns_first_conclusive_response() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let poller = Poller::new(PollConfig::fast().with_max_attempts(5));

        let count = attempt_count.clone();
        let result = poller
            .run(
                || {
                    let count = count.clone();
                    async move {
                        let attempt = count.fetch_add(1, Ordering::SeqCst);
                        if attempt < 2 {
                            Ok::<_, &str>("<NoResult>pending</NoResult>".to_string())
                        } else {
                            Ok("<DOVResult>ok</DOVResult>".to_string())
                        }
                    }
                },
                |v| !v.is_empty() && !v.contains("<NoResult>"),
            )
            .await;

        assert!(result.outcome.is_conclusive());
        assert_eq!(result.attempts, 3);
        assert_eq!(
            result.outcome.into_conclusive().unwrap(),
            "<DOVResult>ok</DOVResult>"
        );
    }

    #[tokio::test]
    async fn test_poll_times_out_after_budget() {
        let poller = Poller::new(PollConfig::fast().with_max_attempts(4));

        let result = poller
            .run(|| async { Ok::<_, &str>(String::new()) }, |v| !v.is_empty())
            .await;

        assert!(!result.outcome.is_conclusive());
        assert_eq!(result.attempts, 4);
        assert_eq!(result.outcome, PollOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_poll_treats_errors_as_inconclusive() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let poller = Poller::new(PollConfig::fast().with_max_attempts(5));

        let count = attempt_count.clone();
        let result = poller
            .run(
                || {
                    let count = count.clone();
                    async move {
                        let attempt = count.fetch_add(1, Ordering::SeqCst);
                        if attempt == 0 {
                            Err("connection reset")
                        } else {
                            Ok("result".to_string())
                        }
                    }
                },
                |v: &String| !v.is_empty(),
            )
            .await;

        assert!(result.outcome.is_conclusive());
        assert_eq!(result.attempts, 2);
    }
}
