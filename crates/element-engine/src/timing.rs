//! Timeout and polling defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs shared by every handle built from the same configuration.
///
/// `resolve_probe` bounds one resolution attempt inside the retry loop and is
/// deliberately independent of `element_wait`: several short resolution
/// attempts fit within one interaction budget.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Timing {
    /// Overall budget for one interaction.
    pub element_wait: Duration,
    /// Sleep between retry attempts. Shorter polls burn driver round-trips.
    pub poll: Duration,
    /// Budget for a single element-resolution attempt.
    pub resolve_probe: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(60),
            poll: Duration::from_millis(500),
            resolve_probe: Duration::from_secs(2),
        }
    }
}
