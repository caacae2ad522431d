//! Driver failure taxonomy.

use thiserror::Error;

/// Failures surfaced by a driver implementation.
///
/// The engine splits these into two families: transient conditions that a
/// re-rendering page is expected to clear on its own, and everything else,
/// which aborts the calling operation on first occurrence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// No element currently matches the locator.
    #[error("no such element: {0}")]
    NotFound(String),

    /// A previously resolved element was detached by a re-render.
    #[error("stale element reference: {0}")]
    Stale(String),

    /// The element exists but cannot receive the interaction yet.
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// Another element would receive the click at this point.
    #[error("click intercepted: {0}")]
    ClickIntercepted(String),

    /// The selector itself is invalid for the chosen strategy.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// The driver session is gone; nothing further can succeed.
    #[error("session lost: {0}")]
    SessionLost(String),

    /// Malformed traffic between the engine and the driver.
    #[error("driver protocol error: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Whether a retry shortly after is expected to clear this failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::NotFound(_)
                | DriverError::Stale(_)
                | DriverError::NotInteractable(_)
                | DriverError::ClickIntercepted(_)
        )
    }
}
