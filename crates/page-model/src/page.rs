//! Base page shell.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use driver_port::DriverPort;
use element_engine::{EngineError, WaitError, Waiter};
use pagewright_core_types::{DriverError, LocatorError};

/// Failure of a page-level operation.
#[derive(Debug, Error)]
pub enum PageError {
    /// The page never reached the expected URL or title.
    #[error("page at {url} failed its {check} sanity check")]
    Sanity { url: String, check: &'static str },

    /// A scraped cell did not parse into its record field.
    #[error("could not parse {field} from `{text}`")]
    Malformed { field: &'static str, text: String },

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Navigation target plus the sanity checks that prove it actually loaded.
///
/// Concrete page objects embed one of these and layer their element handles
/// on top.
pub struct Page {
    driver: Arc<dyn DriverPort>,
    url: String,
    expected_title: Option<String>,
    waiter: Waiter,
    settle: Duration,
}

impl Page {
    pub fn new(driver: Arc<dyn DriverPort>, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            expected_title: None,
            waiter: Waiter::default(),
            settle: Duration::from_secs(60),
        }
    }

    /// Title the loaded document must eventually report.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.expected_title = Some(title.into());
        self
    }

    /// Budget and poll interval for the sanity waits.
    pub fn with_settle(mut self, settle: Duration, poll: Duration) -> Self {
        self.settle = settle;
        self.waiter = Waiter::new(poll);
        self
    }

    pub fn driver(&self) -> Arc<dyn DriverPort> {
        Arc::clone(&self.driver)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Navigate to the page and prove it loaded.
    pub async fn open(&self) -> Result<(), PageError> {
        info!(url = %self.url, "opening page");
        self.driver.goto(&self.url).await?;
        self.sanity_check(true, self.expected_title.is_some()).await
    }

    /// Confirm the driver really is on this page.
    pub async fn sanity_check(&self, check_url: bool, check_title: bool) -> Result<(), PageError> {
        if check_url {
            let driver = self.driver();
            let expected = self.url.clone();
            let outcome = self
                .waiter
                .until(self.settle, move || {
                    url_matches(Arc::clone(&driver), expected.clone())
                })
                .await;
            self.map_sanity(outcome, "url")?;
            info!(url = %self.url, "url sanity check passed");
        }

        if check_title {
            if let Some(expected_title) = &self.expected_title {
                let driver = self.driver();
                let expected = expected_title.clone();
                let outcome = self
                    .waiter
                    .until(self.settle, move || {
                        title_matches(Arc::clone(&driver), expected.clone())
                    })
                    .await;
                self.map_sanity(outcome, "title")?;
                info!(title = %expected_title, "title sanity check passed");
            }
        }
        Ok(())
    }

    pub async fn title(&self) -> Result<String, PageError> {
        Ok(self.driver.title().await?)
    }

    /// Reload and re-prove the page.
    pub async fn refresh(&self) -> Result<(), PageError> {
        info!(url = %self.url, "refreshing page");
        self.driver.refresh().await?;
        self.sanity_check(true, false).await
    }

    fn map_sanity(
        &self,
        outcome: Result<(), WaitError>,
        check: &'static str,
    ) -> Result<(), PageError> {
        match outcome {
            Ok(()) => Ok(()),
            Err(WaitError::Timeout) => Err(PageError::Sanity {
                url: self.url.clone(),
                check,
            }),
            Err(WaitError::Driver(err)) => Err(err.into()),
        }
    }
}

async fn url_matches(
    driver: Arc<dyn DriverPort>,
    expected: String,
) -> Result<Option<()>, DriverError> {
    let current = driver.current_url().await?;
    Ok((current == expected).then_some(()))
}

async fn title_matches(
    driver: Arc<dyn DriverPort>,
    expected: String,
) -> Result<Option<()>, DriverError> {
    let current = driver.title().await?;
    Ok((current == expected).then_some(()))
}
