//! Driver capability ports.
//!
//! The element engine never talks to a browser directly; it consumes the
//! [`DriverPort`] trait, implemented by whatever session adapter the host
//! application provides. Tests supply scripted fakes through the same port.

mod gestures;
mod port;

pub use gestures::*;
pub use port::*;
