//! Dependency readiness gate.
//!
//! Blocks startup until a liveness probe against a required dependency
//! succeeds.
//!
//! # States
//! ```text
//! Probing → Probing: probe failed (log, sleep fixed interval)
//! Probing → Ready:   probe succeeded (terminal)
//! Probing → error:   attempt/elapsed bound hit, or shutdown signalled
//! ```
//!
//! # Design Decisions
//! - Fixed interval, no exponential growth
//! - Unbounded unless a bound is set explicitly
//! - One log event per failed probe, carrying the probe's error
//! - Never re-enters Probing once Ready; later outages belong to the client

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::config::ReadinessConfig;
use crate::lifecycle::shutdown_requested;

/// Why the gate gave up before the dependency became ready.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("{dependency} not ready after {attempts} attempts: {last_error}")]
    Exhausted {
        dependency: String,
        attempts: u32,
        last_error: String,
    },

    #[error("{dependency} not ready after {elapsed:?} ({attempts} attempts): {last_error}")]
    TimedOut {
        dependency: String,
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },

    #[error("gave up waiting for {dependency} after {attempts} attempts: shutdown requested")]
    Cancelled { dependency: String, attempts: u32 },
}

/// Summary of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOutcome {
    /// Probe calls made, including the successful one.
    pub attempts: u32,
    /// Time spent between the first probe and the successful one.
    pub waited: Duration,
}

/// Polls a probe at a fixed interval until it succeeds.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    interval: Duration,
    max_attempts: Option<u32>,
    max_elapsed: Option<Duration>,
}

impl ReadinessGate {
    /// An unbounded gate retrying every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            max_elapsed: None,
        }
    }

    pub fn from_config(config: &ReadinessConfig) -> Self {
        let mut gate = Self::new(Duration::from_secs(config.interval_secs));
        gate.max_attempts = config.max_attempts;
        gate.max_elapsed = config.max_elapsed_secs.map(Duration::from_secs);
        gate
    }

    /// Stop after `attempts` failed probes.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    /// Stop rather than sleep past `elapsed` since the first probe.
    pub fn with_max_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_elapsed = Some(elapsed);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.max_elapsed.is_some()
    }

    /// Call `probe` until it returns `Ok`, sleeping `interval` after each failure.
    ///
    /// A trigger on `shutdown` interrupts the sleep and returns
    /// [`ReadinessError::Cancelled`]. A closed channel never cancels.
    pub async fn wait_until_ready<F, Fut, E>(
        &self,
        dependency: &str,
        mut probe: F,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<ReadinessOutcome, ReadinessError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            let last_error = match probe().await {
                Ok(()) => {
                    let waited = started.elapsed();
                    tracing::info!(
                        dependency = %dependency,
                        attempts,
                        waited = ?waited,
                        "Dependency ready"
                    );
                    return Ok(ReadinessOutcome { attempts, waited });
                }
                Err(e) => e.to_string(),
            };

            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    tracing::error!(
                        dependency = %dependency,
                        attempt = attempts,
                        error = %last_error,
                        "Dependency probe failed, no attempts left"
                    );
                    return Err(ReadinessError::Exhausted {
                        dependency: dependency.to_string(),
                        attempts,
                        last_error,
                    });
                }
            }

            if let Some(max) = self.max_elapsed {
                let elapsed = started.elapsed();
                if elapsed + self.interval > max {
                    tracing::error!(
                        dependency = %dependency,
                        attempt = attempts,
                        elapsed = ?elapsed,
                        error = %last_error,
                        "Dependency probe failed, readiness deadline reached"
                    );
                    return Err(ReadinessError::TimedOut {
                        dependency: dependency.to_string(),
                        attempts,
                        elapsed,
                        last_error,
                    });
                }
            }

            tracing::warn!(
                dependency = %dependency,
                attempt = attempts,
                retry_in = ?self.interval,
                error = %last_error,
                "Dependency probe failed, retrying"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_requested(shutdown) => {
                    tracing::info!(
                        dependency = %dependency,
                        attempts,
                        "Shutdown requested while waiting for dependency"
                    );
                    return Err(ReadinessError::Cancelled {
                        dependency: dependency.to_string(),
                        attempts,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::lifecycle::Shutdown;

    /// Probe failing `failures` times, then succeeding.
    fn flaky(failures: u32, calls: &Cell<u32>) -> impl FnMut() -> std::future::Ready<Result<(), String>> + '_ {
        move || {
            let n = calls.get();
            calls.set(n + 1);
            if n < failures {
                std::future::ready(Err(format!("connection refused ({})", n + 1)))
            } else {
                std::future::ready(Ok(()))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_probe() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let calls = Cell::new(0);
        let gate = ReadinessGate::new(Duration::from_secs(5));

        let started = Instant::now();
        let outcome = gate.wait_until_ready("db", flaky(0, &calls), &mut rx).await.unwrap();

        assert_eq!(outcome, ReadinessOutcome { attempts: 1, waited: Duration::ZERO });
        assert_eq!(calls.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_k_failures_mean_k_plus_one_probes_and_k_sleeps() {
        for k in [1u32, 2, 5, 17] {
            let shutdown = Shutdown::new();
            let mut rx = shutdown.subscribe();
            let calls = Cell::new(0);
            let interval = Duration::from_secs(1);
            let gate = ReadinessGate::new(interval);

            let started = Instant::now();
            let outcome = gate.wait_until_ready("db", flaky(k, &calls), &mut rx).await.unwrap();

            assert_eq!(calls.get(), k + 1);
            assert_eq!(outcome.attempts, k + 1);
            assert_eq!(started.elapsed(), interval * k);
            assert_eq!(outcome.waited, interval * k);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_gate_grows_linearly() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let calls = Cell::new(0);
        let gate = ReadinessGate::new(Duration::from_millis(250));

        let never = || {
            calls.set(calls.get() + 1);
            std::future::ready(Err::<(), _>("still down"))
        };
        let result = tokio::time::timeout(
            Duration::from_millis(60_100),
            gate.wait_until_ready("db", never, &mut rx),
        )
        .await;

        assert!(result.is_err(), "gate must not return while the probe fails");
        // One probe at t=0, then one per 250ms sleep: 240 sleeps fit before the timeout.
        assert_eq!(calls.get(), 241);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_stops_without_trailing_sleep() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let calls = Cell::new(0);
        let gate = ReadinessGate::new(Duration::from_secs(2)).with_max_attempts(3);

        let started = Instant::now();
        let err = gate.wait_until_ready("db", flaky(10, &calls), &mut rx).await.unwrap_err();

        assert_eq!(
            err,
            ReadinessError::Exhausted {
                dependency: "db".into(),
                attempts: 3,
                last_error: "connection refused (3)".into(),
            }
        );
        assert_eq!(calls.get(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_elapsed_never_oversleeps() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let calls = Cell::new(0);
        let gate = ReadinessGate::new(Duration::from_secs(3)).with_max_elapsed(Duration::from_secs(10));

        let started = Instant::now();
        let err = gate.wait_until_ready("db", flaky(100, &calls), &mut rx).await.unwrap_err();

        // Probes at 0, 3, 6, 9; sleeping to 12 would pass the deadline.
        assert_eq!(calls.get(), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(9));
        assert!(matches!(err, ReadinessError::TimedOut { attempts: 4, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_sleep() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let calls = Cell::new(0);
        let gate = ReadinessGate::new(Duration::from_secs(30));

        let trigger = async {
            tokio::time::sleep(Duration::from_secs(45)).await;
            shutdown.trigger();
        };
        let (result, ()) = tokio::join!(gate.wait_until_ready("db", flaky(100, &calls), &mut rx), trigger);

        assert_eq!(
            result.unwrap_err(),
            ReadinessError::Cancelled { dependency: "db".into(), attempts: 2 }
        );
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_shutdown_does_not_cancel() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        drop(shutdown);

        let calls = Cell::new(0);
        let gate = ReadinessGate::new(Duration::from_secs(1));
        let outcome = gate.wait_until_ready("db", flaky(3, &calls), &mut rx).await.unwrap();

        assert_eq!(outcome.attempts, 4);
    }

    #[test]
    fn test_from_config() {
        let unbounded = ReadinessGate::from_config(&ReadinessConfig::default());
        assert_eq!(unbounded.interval(), Duration::from_secs(5));
        assert!(!unbounded.is_bounded());

        let bounded = ReadinessGate::from_config(&ReadinessConfig {
            interval_secs: 1,
            max_attempts: Some(4),
            max_elapsed_secs: None,
        });
        assert!(bounded.is_bounded());
    }
}
