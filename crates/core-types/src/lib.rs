//! Shared primitives for the pagewright workspace.
//!
//! Everything the driver port and the element engine need to agree on lives
//! here: selector strategies, concrete and parameterizable locators, the
//! driver failure taxonomy with its transient/fatal split, and a few small
//! value types used across the crate boundary.

pub mod errors;
pub mod locator;

pub use errors::*;
pub use locator::*;

use serde::{Deserialize, Serialize};

/// Rendered size of an element, as reported by the driver.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ElemSize {
    pub width: u32,
    pub height: u32,
}

/// Mouse buttons understood by the gesture builder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl Default for MouseButton {
    fn default() -> Self {
        MouseButton::Left
    }
}
