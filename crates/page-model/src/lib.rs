//! Page objects built on the element engine.
//!
//! The engine knows nothing about any particular page; this crate does. It
//! carries the base page shell (navigation plus sanity checks) and the
//! concrete page object for the programming-languages popularity table,
//! along with the record type scraped out of it.

pub mod languages;
pub mod page;
pub mod records;

pub use languages::{LanguagesLocators, LanguagesPage, LANGUAGES_PAGE_TITLE};
pub use page::{Page, PageError};
pub use records::LanguageRecord;
