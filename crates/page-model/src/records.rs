//! Records scraped from pages.

use serde::{Deserialize, Serialize};

/// One row of the programming-languages popularity table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageRecord {
    pub website: String,
    /// Unique visitors per month, in millions.
    pub popularity: f64,
    pub front_end: Vec<String>,
    pub back_end: Vec<String>,
    pub database: Vec<String>,
    pub note: Option<String>,
}
