//! Single-shot interaction contracts.
//!
//! An action runs exactly once per retry attempt against an element the
//! engine just resolved; it never retries itself. The typed accessors on
//! [`ElementHandle`](crate::ElementHandle) are thin wrappers that build one
//! of these and hand it to the retry loop.

use async_trait::async_trait;

use driver_port::{DriverPort, ElementRef, Gestures};
use pagewright_core_types::{DriverError, ElemSize};

/// A single-shot unit of interaction against an already-resolved element.
///
/// `Ok(None)` means the action observed the element but the condition it
/// waits for has not been met yet — the retry loop treats that as "try
/// again". `last_value` is whatever the action last saw; it surfaces in
/// timeout diagnostics and is the carrier for cross-attempt state.
#[async_trait]
pub trait Action: Send {
    type Output: Send;

    /// Short verb for logs and timeout diagnostics.
    fn describe(&self) -> &'static str;

    /// The value this action last observed.
    fn last_value(&self) -> Option<String> {
        None
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<Self::Output>, DriverError>;
}

pub(crate) struct Click;

#[async_trait]
impl Action for Click {
    type Output = ();

    fn describe(&self) -> &'static str {
        "click"
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        driver.click(target).await.map(Some)
    }
}

pub(crate) struct Clear;

#[async_trait]
impl Action for Clear {
    type Output = ();

    fn describe(&self) -> &'static str {
        "clear"
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        driver.clear(target).await.map(Some)
    }
}

pub(crate) struct SendKeys {
    pub text: String,
}

#[async_trait]
impl Action for SendKeys {
    type Output = ();

    fn describe(&self) -> &'static str {
        "send keys"
    }

    fn last_value(&self) -> Option<String> {
        Some(self.text.clone())
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        driver.send_keys(target, &self.text).await.map(Some)
    }
}

pub(crate) struct Submit;

#[async_trait]
impl Action for Submit {
    type Output = ();

    fn describe(&self) -> &'static str {
        "submit"
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        driver.submit(target).await.map(Some)
    }
}

#[derive(Default)]
pub(crate) struct ReadText {
    last: Option<String>,
}

#[async_trait]
impl Action for ReadText {
    type Output = String;

    fn describe(&self) -> &'static str {
        "read text"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<String>, DriverError> {
        let text = driver.text(target).await?;
        self.last = Some(text.clone());
        Ok(Some(text))
    }
}

pub(crate) struct ReadAttribute {
    pub name: String,
    last: Option<String>,
}

impl ReadAttribute {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last: None,
        }
    }
}

#[async_trait]
impl Action for ReadAttribute {
    type Output = Option<String>;

    fn describe(&self) -> &'static str {
        "read attribute"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<Option<String>>, DriverError> {
        let value = driver.attribute(target, &self.name).await?;
        self.last = value.clone();
        Ok(Some(value))
    }
}

pub(crate) struct ReadProperty {
    pub name: String,
    last: Option<String>,
}

impl ReadProperty {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last: None,
        }
    }
}

#[async_trait]
impl Action for ReadProperty {
    type Output = Option<String>;

    fn describe(&self) -> &'static str {
        "read property"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<Option<String>>, DriverError> {
        let value = driver.property(target, &self.name).await?;
        self.last = value.clone();
        Ok(Some(value))
    }
}

#[derive(Default)]
pub(crate) struct IsSelected {
    last: Option<String>,
}

#[async_trait]
impl Action for IsSelected {
    type Output = bool;

    fn describe(&self) -> &'static str {
        "is selected"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<bool>, DriverError> {
        let selected = driver.is_selected(target).await?;
        self.last = Some(selected.to_string());
        Ok(Some(selected))
    }
}

#[derive(Default)]
pub(crate) struct IsEnabled {
    last: Option<String>,
}

#[async_trait]
impl Action for IsEnabled {
    type Output = bool;

    fn describe(&self) -> &'static str {
        "is enabled"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<bool>, DriverError> {
        let enabled = driver.is_enabled(target).await?;
        self.last = Some(enabled.to_string());
        Ok(Some(enabled))
    }
}

#[derive(Default)]
pub(crate) struct ReadSize {
    last: Option<String>,
}

#[async_trait]
impl Action for ReadSize {
    type Output = ElemSize;

    fn describe(&self) -> &'static str {
        "read size"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<ElemSize>, DriverError> {
        let size = driver.size(target).await?;
        self.last = Some(format!("{}x{}", size.width, size.height));
        Ok(Some(size))
    }
}

pub(crate) struct ContextClick;

#[async_trait]
impl Action for ContextClick {
    type Output = ();

    fn describe(&self) -> &'static str {
        "context click"
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        driver.perform(&Gestures::context_click(target)).await.map(Some)
    }
}

pub(crate) struct DragTo {
    pub dest: ElementRef,
}

#[async_trait]
impl Action for DragTo {
    type Output = ();

    fn describe(&self) -> &'static str {
        "drag to"
    }

    fn last_value(&self) -> Option<String> {
        Some(self.dest.to_string())
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        driver
            .perform(&Gestures::drag_and_drop(target, &self.dest))
            .await
            .map(Some)
    }
}

/// Waits for the element's text to settle on a value.
///
/// With `expected` set, the text must equal it after trimming; otherwise any
/// non-empty text satisfies the wait.
pub(crate) struct ExpectText {
    expected: Option<String>,
    last: Option<String>,
}

impl ExpectText {
    pub(crate) fn new(expected: Option<String>) -> Self {
        Self {
            expected,
            last: None,
        }
    }
}

#[async_trait]
impl Action for ExpectText {
    type Output = ();

    fn describe(&self) -> &'static str {
        "wait for text"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        let text = driver.text(target).await?;
        self.last = Some(text.clone());
        let satisfied = match &self.expected {
            Some(expected) => text.trim() == expected,
            None => !text.trim().is_empty(),
        };
        Ok(satisfied.then_some(()))
    }
}

/// Waits for the element's text to move away from whatever it showed when
/// the wait began. The baseline is captured on the first attempt and carried
/// across retries.
#[derive(Default)]
pub(crate) struct TextChanged {
    baseline: Option<String>,
    last: Option<String>,
}

#[async_trait]
impl Action for TextChanged {
    type Output = ();

    fn describe(&self) -> &'static str {
        "wait for text change"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        target: &ElementRef,
    ) -> Result<Option<()>, DriverError> {
        let text = driver.text(target).await?;
        self.last = Some(text.clone());
        match &self.baseline {
            None => {
                self.baseline = Some(text);
                Ok(None)
            }
            Some(baseline) if text != *baseline => Ok(Some(())),
            Some(_) => Ok(None),
        }
    }
}
