//! Poll-until-settled condition waiting.
//!
//! A [`Waiter`] evaluates a probe over and over with a sleep in between,
//! treating transient driver failures as "not yet". Three terminations are
//! supported: a value within a duration budget, sustained absence within a
//! budget, and an absolute wall-clock deadline.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use pagewright_core_types::DriverError;

/// Why a wait did not produce a value.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("condition not met within the budget")]
    Timeout,

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Sleep-and-repoll loop over an arbitrary probe.
///
/// The probe yields `Ok(Some(value))` once the condition holds, `Ok(None)`
/// while it does not, and `Err` for driver failures; transient failures are
/// absorbed, everything else propagates unmodified.
#[derive(Clone, Copy, Debug)]
pub struct Waiter {
    poll: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(500),
        }
    }
}

impl Waiter {
    pub fn new(poll: Duration) -> Self {
        Self { poll }
    }

    pub fn poll(&self) -> Duration {
        self.poll
    }

    /// Poll until the probe yields a value or `budget` elapses.
    ///
    /// The first probe always runs; the budget is only checked after a
    /// failed attempt, so a zero budget still gets one try.
    pub async fn until<T, F, Fut>(&self, budget: Duration, mut probe: F) -> Result<T, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        let deadline = Instant::now() + budget;
        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(err) if err.is_transient() => {
                    debug!(%err, "probe not ready");
                }
                Err(err) => return Err(WaitError::Driver(err)),
            }
            sleep(self.poll).await;
            if Instant::now() > deadline {
                return Err(WaitError::Timeout);
            }
        }
    }

    /// Poll for the whole `budget` expecting the probe to stay empty.
    ///
    /// Returns `false` the moment the probe yields a value, `true` when the
    /// budget elapses without one. Absence is an expected terminal state
    /// here, so the outcome is a signal rather than an error.
    pub async fn until_none<T, F, Fut>(
        &self,
        budget: Duration,
        mut probe: F,
    ) -> Result<bool, DriverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        let deadline = Instant::now() + budget;
        loop {
            match probe().await {
                Ok(Some(_)) => return Ok(false),
                Ok(None) => {}
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
            sleep(self.poll).await;
            if Instant::now() > deadline {
                return Ok(true);
            }
        }
    }

    /// Poll while the probe keeps succeeding, bounded by a wall-clock instant.
    ///
    /// Returns `true` once `until` passes with the probe still yielding a
    /// value on every iteration, `false` the moment it stops. The deadline
    /// comparison runs before the success check, so an expired deadline wins
    /// even when the last probe failed.
    pub async fn until_deadline<T, F, Fut>(
        &self,
        until: DateTime<Utc>,
        mut probe: F,
    ) -> Result<bool, DriverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        debug!(deadline = %until.format("%Y-%m-%d %H:%M:%S"), "waiting against wall clock");
        loop {
            let holding = match probe().await {
                Ok(Some(_)) => true,
                Ok(None) => false,
                Err(err) if err.is_transient() => false,
                Err(err) => return Err(err),
            };
            if Utc::now() >= until {
                return Ok(true);
            }
            if !holding {
                return Ok(false);
            }
            sleep(self.poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast() -> Waiter {
        Waiter::new(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn until_returns_value_after_transient_misses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let value = fast()
            .until(Duration::from_millis(500), move || {
                let seen = seen.clone();
                async move {
                    match seen.fetch_add(1, Ordering::SeqCst) {
                        0 => Err(DriverError::NotFound("probe".into())),
                        1 => Ok(None),
                        _ => Ok(Some(42)),
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn until_times_out_but_probes_at_least_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let result: Result<u8, _> = fast()
            .until(Duration::ZERO, move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            })
            .await;
        assert!(matches!(result, Err(WaitError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn until_propagates_fatal_failures_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let result: Result<u8, _> = fast()
            .until(Duration::from_secs(5), move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Err(DriverError::SessionLost("gone".into()))
                }
            })
            .await;
        assert!(matches!(
            result,
            Err(WaitError::Driver(DriverError::SessionLost(_)))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn until_none_reports_sustained_absence() {
        let absent = fast()
            .until_none::<u8, _, _>(Duration::from_millis(30), || async {
                Err(DriverError::NotFound("never there".into()))
            })
            .await
            .unwrap();
        assert!(absent);
    }

    #[tokio::test]
    async fn until_none_reports_presence_immediately() {
        let absent = fast()
            .until_none(Duration::from_millis(200), || async { Ok(Some(1u8)) })
            .await
            .unwrap();
        assert!(!absent);
    }

    #[tokio::test]
    async fn until_deadline_true_when_probe_outlasts_deadline() {
        let deadline = Utc::now() + chrono::Duration::milliseconds(40);
        let held = fast()
            .until_deadline(deadline, || async { Ok(Some(1u8)) })
            .await
            .unwrap();
        assert!(held);
    }

    #[tokio::test]
    async fn until_deadline_false_once_probe_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let deadline = Utc::now() + chrono::Duration::seconds(30);
        let held = fast()
            .until_deadline(deadline, move || {
                let seen = seen.clone();
                async move {
                    match seen.fetch_add(1, Ordering::SeqCst) {
                        0 | 1 => Ok(Some(1u8)),
                        _ => Err(DriverError::NotFound("vanished".into())),
                    }
                }
            })
            .await
            .unwrap();
        assert!(!held);
    }
}
