//! Page object for the programming-languages popularity table.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::info;

use driver_port::DriverPort;
use element_engine::{ElementHandle, ElementsHandle, EngineError, Timing};
use pagewright_core_types::{Locator, LocatorTemplate};

use crate::page::{Page, PageError};
use crate::records::LanguageRecord;

pub const LANGUAGES_PAGE_TITLE: &str = "Programming languages used in most popular websites";

/// Budget for counting rows; a missing table should answer "none" quickly
/// rather than spending the full element wait.
const ROW_COUNT_TIMEOUT: Duration = Duration::from_secs(10);

/// Locator table for the page. Row-cell locators are templates bound to a
/// 1-based row number at access time.
#[derive(Clone, Debug)]
pub struct LanguagesLocators {
    pub page_url: String,
    pub sanity_caption: Locator,
    pub all_rows: Locator,
    pub website_cell: LocatorTemplate,
    pub popularity_cell: LocatorTemplate,
    pub front_end_cell: LocatorTemplate,
    pub back_end_cell: LocatorTemplate,
    pub database_cell: LocatorTemplate,
    pub note_cell: LocatorTemplate,
}

impl LanguagesLocators {
    pub fn for_base_url(base: &str) -> Self {
        Self {
            page_url: base.to_owned(),
            sanity_caption: Locator::xpath(
                "//table/caption[contains(text(),'Programming languages')]",
            ),
            all_rows: Locator::xpath("//table[1]//tbody//tr"),
            website_cell: LocatorTemplate::xpath("//table[1]//tbody//tr[{}]/td[1]/a"),
            popularity_cell: LocatorTemplate::xpath("//table[1]//tbody//tr[{}]/td[2]"),
            front_end_cell: LocatorTemplate::xpath("//table[1]//tbody//tr[{}]/td[3]"),
            back_end_cell: LocatorTemplate::xpath("//table[1]//tbody//tr[{}]/td[4]"),
            database_cell: LocatorTemplate::xpath("//table[1]//tbody//tr[{}]/td[5]"),
            note_cell: LocatorTemplate::xpath("//table[1]//tbody//tr[{}]/td[6]"),
        }
    }
}

/// The loaded page, ready for scraping.
pub struct LanguagesPage {
    driver: Arc<dyn DriverPort>,
    locs: LanguagesLocators,
    timing: Timing,
    page: Page,
    rows: ElementsHandle,
}

impl std::fmt::Debug for LanguagesPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguagesPage")
            .field("locs", &self.locs)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl LanguagesPage {
    /// Navigate to the table and prove it rendered.
    pub async fn open(driver: Arc<dyn DriverPort>, base_url: &str) -> Result<Self, PageError> {
        Self::open_with_timing(driver, base_url, Timing::default()).await
    }

    pub async fn open_with_timing(
        driver: Arc<dyn DriverPort>,
        base_url: &str,
        timing: Timing,
    ) -> Result<Self, PageError> {
        let locs = LanguagesLocators::for_base_url(base_url);
        let page = Page::new(Arc::clone(&driver), locs.page_url.clone())
            .with_title(LANGUAGES_PAGE_TITLE)
            .with_settle(timing.element_wait, timing.poll);
        page.open().await?;

        let mut caption = ElementHandle::new(Arc::clone(&driver), locs.sanity_caption.clone())
            .with_role("caption")
            .with_timing(timing);
        caption.on_page().await?;
        info!(url = base_url, "languages table is on the page");

        let rows = ElementsHandle::new(Arc::clone(&driver), locs.all_rows.clone())
            .with_role("table rows")
            .with_timing(timing)
            .with_timeout(ROW_COUNT_TIMEOUT.min(timing.element_wait));

        Ok(Self {
            driver,
            locs,
            timing,
            page,
            rows,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Number of table rows; an empty or missing table reads as zero.
    pub async fn website_count(&mut self) -> Result<usize, PageError> {
        match self.rows.count().await {
            Ok(count) => Ok(count),
            Err(EngineError::Timeout { .. }) => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn website(&self, row: usize) -> Result<String, PageError> {
        self.cell_text(&self.locs.website_cell, row).await
    }

    /// Unique visitors per month, parsed out of a cell like `1,120[2]`.
    pub async fn popularity(&self, row: usize) -> Result<f64, PageError> {
        let text = self.cell_text(&self.locs.popularity_cell, row).await?;
        parse_popularity(&text)
    }

    pub async fn front_end(&self, row: usize) -> Result<Vec<String>, PageError> {
        Ok(split_list(
            &self.cell_text(&self.locs.front_end_cell, row).await?,
        ))
    }

    pub async fn back_end(&self, row: usize) -> Result<Vec<String>, PageError> {
        Ok(split_list(
            &self.cell_text(&self.locs.back_end_cell, row).await?,
        ))
    }

    pub async fn database(&self, row: usize) -> Result<Vec<String>, PageError> {
        Ok(split_list(
            &self.cell_text(&self.locs.database_cell, row).await?,
        ))
    }

    pub async fn note(&self, row: usize) -> Result<Option<String>, PageError> {
        let text = self.cell_text(&self.locs.note_cell, row).await?;
        let trimmed = text.trim();
        Ok(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        })
    }

    /// Read the whole table into records, row by row.
    pub async fn scrape(&mut self) -> Result<Vec<LanguageRecord>, PageError> {
        let count = self.website_count().await?;
        info!(rows = count, "scraping languages table");
        let mut records = Vec::with_capacity(count);
        for row in 1..=count {
            records.push(LanguageRecord {
                website: self.website(row).await?,
                popularity: self.popularity(row).await?,
                front_end: self.front_end(row).await?,
                back_end: self.back_end(row).await?,
                database: self.database(row).await?,
                note: self.note(row).await?,
            });
        }
        Ok(records)
    }

    /// Each access builds a fresh cell handle; nothing about a row is cached
    /// between reads.
    async fn cell_text(&self, template: &LocatorTemplate, row: usize) -> Result<String, PageError> {
        let locator = template.bind(&[&row.to_string()])?;
        let mut cell = ElementHandle::new(Arc::clone(&self.driver), locator)
            .with_role("table cell")
            .with_timing(self.timing);
        Ok(cell.text().await?)
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|part| part.trim().to_owned())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_popularity(text: &str) -> Result<f64, PageError> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"\b\d+\b").expect("static pattern"));

    // footnote markers like `[2]` trail the number; cut them off first
    let head = text.split('[').next().unwrap_or_default();
    let joined: String = digits.find_iter(head).map(|m| m.as_str()).collect();
    joined
        .parse::<f64>()
        .map_err(|_| PageError::Malformed {
            field: "popularity",
            text: text.to_owned(),
        })
}
