use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pagewright_core_types::{DriverError, ElemSize, Locator};

use crate::gestures::Gestures;

/// Opaque reference to a live element inside the driver session.
///
/// A reference is only as fresh as the resolution that produced it; the
/// driver answers [`DriverError::Stale`] for a reference whose node was
/// replaced by a re-render.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The capability set the engine requires from a driver session.
///
/// One method per wire operation, mirroring the remote end's verbs. All
/// failures come back as [`DriverError`]; the engine decides what is worth
/// retrying.
#[async_trait]
pub trait DriverPort: Send + Sync {
    /// Look up the first element matching the locator.
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef, DriverError>;

    /// Look up every element matching the locator, in document order.
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>, DriverError>;

    async fn click(&self, el: &ElementRef) -> Result<(), DriverError>;

    async fn clear(&self, el: &ElementRef) -> Result<(), DriverError>;

    async fn send_keys(&self, el: &ElementRef, text: &str) -> Result<(), DriverError>;

    async fn text(&self, el: &ElementRef) -> Result<String, DriverError>;

    async fn attribute(&self, el: &ElementRef, name: &str)
        -> Result<Option<String>, DriverError>;

    async fn property(&self, el: &ElementRef, name: &str) -> Result<Option<String>, DriverError>;

    async fn is_selected(&self, el: &ElementRef) -> Result<bool, DriverError>;

    async fn is_enabled(&self, el: &ElementRef) -> Result<bool, DriverError>;

    async fn submit(&self, el: &ElementRef) -> Result<(), DriverError>;

    async fn size(&self, el: &ElementRef) -> Result<ElemSize, DriverError>;

    /// Replay a composed input sequence (drag-and-drop, context clicks).
    async fn perform(&self, gestures: &Gestures) -> Result<(), DriverError>;

    // Page-level surface used by the page-object layer.

    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn title(&self) -> Result<String, DriverError>;

    async fn refresh(&self) -> Result<(), DriverError>;
}
