//! Engine-level failures.

use std::time::Duration;

use thiserror::Error;

use pagewright_core_types::{DriverError, Locator, LocatorError};

/// Failure of a complete engine operation.
///
/// `Timeout` means the retry budget ran out while the page never settled; it
/// carries everything needed to diagnose the run from the log alone. Driver
/// failures outside the transient set and locator configuration mistakes
/// pass through unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "{role} `{action}` timed out after {budget:?} on {locator} \
         (last resolved: {last_resolved}, last value: {last_value})"
    )]
    Timeout {
        /// Semantic role of the handle ("element", "button", "collection", ...).
        role: &'static str,
        /// The action that was being retried.
        action: &'static str,
        locator: Locator,
        budget: Duration,
        /// Display form of the most recent resolution, or "none".
        last_resolved: String,
        /// The action's last recorded debug value, or "none".
        last_value: String,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Locator(#[from] LocatorError),
}

impl EngineError {
    pub(crate) fn timeout(
        role: &'static str,
        action: &'static str,
        locator: Locator,
        budget: Duration,
        last_resolved: Option<String>,
        last_value: Option<String>,
    ) -> Self {
        EngineError::Timeout {
            role,
            action,
            locator,
            budget,
            last_resolved: last_resolved.unwrap_or_else(|| "none".into()),
            last_value: last_value.unwrap_or_else(|| "none".into()),
        }
    }
}
