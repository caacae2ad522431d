//! Collection contracts and the continuable bulk read.
//!
//! Reading one value from every element in a rendering collection can lose
//! individual elements to re-renders partway through. [`BulkRead`] keeps an
//! explicit checkpoint of how far it got; when an element vanishes
//! mid-iteration it stops with a short-read signal, and the next retry
//! resumes from the first unread index instead of starting over.

use async_trait::async_trait;
use tracing::debug;

use driver_port::{DriverPort, ElementRef};
use pagewright_core_types::DriverError;

/// Why a collection action stopped.
#[derive(Debug)]
pub enum ListInterrupt {
    /// Plain driver failure, classified like any single-element outcome.
    Driver(DriverError),
    /// A bulk read stopped at `at`; progress up to there is checkpointed.
    Short { at: usize },
}

impl From<DriverError> for ListInterrupt {
    fn from(err: DriverError) -> Self {
        ListInterrupt::Driver(err)
    }
}

/// Single-shot contract against a freshly resolved collection.
///
/// Same shape as [`Action`](crate::Action) but over the whole element list;
/// `Ok(None)` again means "condition not met yet".
#[async_trait]
pub trait ListAction: Send {
    type Output: Send;

    fn describe(&self) -> &'static str;

    fn last_value(&self) -> Option<String> {
        None
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        targets: &[ElementRef],
    ) -> Result<Option<Self::Output>, ListInterrupt>;
}

/// Reads one value from one element of a collection.
#[async_trait]
pub trait FieldReader: Send + Sync {
    type Value: Send;

    fn describe(&self) -> String;

    async fn read(
        &self,
        driver: &dyn DriverPort,
        el: &ElementRef,
    ) -> Result<Self::Value, DriverError>;
}

/// Visible text of each element.
pub struct TextField;

#[async_trait]
impl FieldReader for TextField {
    type Value = String;

    fn describe(&self) -> String {
        "text".into()
    }

    async fn read(
        &self,
        driver: &dyn DriverPort,
        el: &ElementRef,
    ) -> Result<String, DriverError> {
        driver.text(el).await
    }
}

/// A named attribute of each element.
pub struct AttributeField(pub String);

#[async_trait]
impl FieldReader for AttributeField {
    type Value = Option<String>;

    fn describe(&self) -> String {
        format!("attribute `{}`", self.0)
    }

    async fn read(
        &self,
        driver: &dyn DriverPort,
        el: &ElementRef,
    ) -> Result<Option<String>, DriverError> {
        driver.attribute(el, &self.0).await
    }
}

/// A named property of each element.
pub struct PropertyField(pub String);

#[async_trait]
impl FieldReader for PropertyField {
    type Value = Option<String>;

    fn describe(&self) -> String {
        format!("property `{}`", self.0)
    }

    async fn read(
        &self,
        driver: &dyn DriverPort,
        el: &ElementRef,
    ) -> Result<Option<String>, DriverError> {
        driver.property(el, &self.0).await
    }
}

/// Progress marker for a bulk read: results committed so far and the index
/// to resume from. Reset at the start of every new bulk operation; mutated
/// only when recovering from a transient mid-list failure.
struct Checkpoint<T> {
    start: usize,
    partial: Vec<T>,
}

impl<T> Default for Checkpoint<T> {
    fn default() -> Self {
        Self {
            start: 0,
            partial: Vec::new(),
        }
    }
}

/// Checkpointed read of one field across the whole collection.
///
/// Shrink detection is by length only: a resume index beyond the current
/// collection length discards the checkpoint and starts over. A replacement
/// collection of the same length resumes silently — indistinguishable from
/// the original without element identity, which the driver port does not
/// offer.
pub(crate) struct BulkRead<R: FieldReader> {
    reader: R,
    checkpoint: Checkpoint<R::Value>,
}

impl<R: FieldReader> BulkRead<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            checkpoint: Checkpoint::default(),
        }
    }
}

#[async_trait]
impl<R: FieldReader> ListAction for BulkRead<R> {
    type Output = Vec<R::Value>;

    fn describe(&self) -> &'static str {
        "bulk read"
    }

    fn last_value(&self) -> Option<String> {
        Some(format!(
            "{}: {} read, resume at {}",
            self.reader.describe(),
            self.checkpoint.partial.len(),
            self.checkpoint.start
        ))
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        targets: &[ElementRef],
    ) -> Result<Option<Vec<R::Value>>, ListInterrupt> {
        if self.checkpoint.start >= targets.len() {
            // collection shrank below the resume point; start over
            if self.checkpoint.start > 0 {
                debug!(
                    resume = self.checkpoint.start,
                    len = targets.len(),
                    "collection shrank; discarding checkpoint"
                );
            }
            self.checkpoint = Checkpoint::default();
        }

        let mut results = std::mem::take(&mut self.checkpoint.partial);
        for (index, el) in targets.iter().enumerate().skip(self.checkpoint.start) {
            match self.reader.read(driver, el).await {
                Ok(value) => results.push(value),
                Err(err) if err.is_transient() => {
                    debug!(index, %err, "bulk read interrupted");
                    self.checkpoint.start = index;
                    self.checkpoint.partial = results;
                    return Err(ListInterrupt::Short { at: index });
                }
                Err(err) => return Err(ListInterrupt::Driver(err)),
            }
        }

        self.checkpoint = Checkpoint::default();
        Ok(Some(results))
    }
}

/// Number of elements currently in the collection.
pub(crate) struct Count;

#[async_trait]
impl ListAction for Count {
    type Output = usize;

    fn describe(&self) -> &'static str {
        "count"
    }

    async fn run(
        &mut self,
        _driver: &dyn DriverPort,
        targets: &[ElementRef],
    ) -> Result<Option<usize>, ListInterrupt> {
        Ok(Some(targets.len()))
    }
}

pub(crate) struct ClickByIndex {
    pub index: usize,
}

#[async_trait]
impl ListAction for ClickByIndex {
    type Output = ();

    fn describe(&self) -> &'static str {
        "click by index"
    }

    fn last_value(&self) -> Option<String> {
        Some(self.index.to_string())
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        targets: &[ElementRef],
    ) -> Result<Option<()>, ListInterrupt> {
        let el = nth(targets, self.index)?;
        driver.click(el).await?;
        Ok(Some(()))
    }
}

pub(crate) struct IsSelectedByIndex {
    pub index: usize,
    last: Option<String>,
}

impl IsSelectedByIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self { index, last: None }
    }
}

#[async_trait]
impl ListAction for IsSelectedByIndex {
    type Output = bool;

    fn describe(&self) -> &'static str {
        "is selected by index"
    }

    fn last_value(&self) -> Option<String> {
        self.last.clone()
    }

    async fn run(
        &mut self,
        driver: &dyn DriverPort,
        targets: &[ElementRef],
    ) -> Result<Option<bool>, ListInterrupt> {
        let el = nth(targets, self.index)?;
        let selected = driver.is_selected(el).await?;
        self.last = Some(selected.to_string());
        Ok(Some(selected))
    }
}

/// An index beyond the current collection reads as not-found: the rest of
/// the collection may simply not have rendered yet.
fn nth(targets: &[ElementRef], index: usize) -> Result<&ElementRef, ListInterrupt> {
    targets.get(index).ok_or_else(|| {
        ListInterrupt::Driver(DriverError::NotFound(format!(
            "index {} beyond collection of {}",
            index,
            targets.len()
        )))
    })
}
