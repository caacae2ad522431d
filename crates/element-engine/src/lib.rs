//! Retry/polling element-interaction engine.
//!
//! Drives a web page reliably while it re-renders underneath: handles are
//! resolved lazily on every access, every interaction runs inside a
//! bounded-time retry loop that distinguishes transient page conditions from
//! fatal driver failures, and bulk reads over collections checkpoint their
//! progress so a single stale element never forces a full restart.

pub mod actions;
pub mod bulk;
pub mod errors;
mod handle;
mod retry;
pub mod timing;
pub mod waiting;

pub use actions::Action;
pub use bulk::{AttributeField, FieldReader, ListAction, ListInterrupt, PropertyField, TextField};
pub use errors::EngineError;
pub use handle::{ElementHandle, ElementsHandle, ResolveWhen, VALUE_PROPERTY};
pub use timing::Timing;
pub use waiting::{WaitError, Waiter};
