//! Attempt classification for the bounded retry loop.
//!
//! Interactions never branch on error types directly: each resolve+act
//! attempt is folded into an [`Attempt`] tag and the loop dispatches on the
//! tag alone.

use pagewright_core_types::DriverError;

/// Reason an attempt is worth repeating.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Retry {
    /// Nothing matched the locator within the resolution probe.
    Missing,
    /// The resolved element detached before the action landed.
    Stale,
    /// Present but refusing interaction.
    NotInteractable,
    /// Something else would swallow the click.
    Intercepted,
    /// A bulk read stopped partway; the checkpoint holds the progress.
    ShortRead,
    /// The action ran but its condition is not satisfied yet.
    Pending,
}

impl Retry {
    pub(crate) fn from_transient(err: &DriverError) -> Option<Retry> {
        match err {
            DriverError::NotFound(_) => Some(Retry::Missing),
            DriverError::Stale(_) => Some(Retry::Stale),
            DriverError::NotInteractable(_) => Some(Retry::NotInteractable),
            DriverError::ClickIntercepted(_) => Some(Retry::Intercepted),
            _ => None,
        }
    }

    pub(crate) fn describe(self) -> &'static str {
        match self {
            Retry::Missing => "missing",
            Retry::Stale => "stale",
            Retry::NotInteractable => "not interactable",
            Retry::Intercepted => "intercepted",
            Retry::ShortRead => "short read",
            Retry::Pending => "pending",
        }
    }
}

/// Outcome of one resolve+act attempt.
pub(crate) enum Attempt<T> {
    Done(T),
    Again(Retry),
    Abort(DriverError),
}

impl<T> Attempt<T> {
    pub(crate) fn classify(result: Result<Option<T>, DriverError>) -> Self {
        match result {
            Ok(Some(value)) => Attempt::Done(value),
            Ok(None) => Attempt::Again(Retry::Pending),
            Err(err) => match Retry::from_transient(&err) {
                Some(kind) => Attempt::Again(kind),
                None => Attempt::Abort(err),
            },
        }
    }
}
