//! Lazy element handles.
//!
//! A handle is the engine's durable reference to a logical page element: a
//! locator plus timing, never a cached node. Every interaction re-resolves
//! the locator from scratch, because the node a previous access found may
//! have been replaced by a re-render since. The `last_resolved` slot is
//! overwritten on each attempt and exists only for diagnostics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use driver_port::{DriverPort, ElementRef};
use pagewright_core_types::{DriverError, ElemSize, Locator, LocatorTemplate};

use crate::actions::{
    Action, Clear, Click, ContextClick, DragTo, ExpectText, IsEnabled, IsSelected, ReadAttribute,
    ReadProperty, ReadSize, ReadText, SendKeys, Submit, TextChanged,
};
use crate::bulk::{
    AttributeField, BulkRead, ClickByIndex, Count, FieldReader, IsSelectedByIndex, ListAction,
    ListInterrupt, PropertyField, TextField,
};
use crate::errors::EngineError;
use crate::retry::{Attempt, Retry};
use crate::timing::Timing;
use crate::waiting::{WaitError, Waiter};

/// The DOM property mirroring an input's current value.
pub const VALUE_PROPERTY: &str = "value";

/// Condition an element must meet before an interaction may run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveWhen {
    /// The locator matches something.
    Present,
    /// Matches and is enabled for interaction.
    Clickable,
}

/// Lazy handle to zero-or-one element.
pub struct ElementHandle {
    driver: Arc<dyn DriverPort>,
    locator: Locator,
    role: &'static str,
    resolve_when: ResolveWhen,
    timing: Timing,
    timeout: Duration,
    waiter: Waiter,
    last_resolved: Option<ElementRef>,
}

impl ElementHandle {
    /// Generic element resolved on presence.
    pub fn new(driver: Arc<dyn DriverPort>, locator: Locator) -> Self {
        Self::with_condition(driver, locator, "element", ResolveWhen::Present)
    }

    /// Interactive control resolved on clickability.
    pub fn button(driver: Arc<dyn DriverPort>, locator: Locator) -> Self {
        Self::with_condition(driver, locator, "button", ResolveWhen::Clickable)
    }

    /// Build from a template that must carry no unbound placeholders.
    pub fn from_template(
        driver: Arc<dyn DriverPort>,
        template: &LocatorTemplate,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(driver, template.fixed()?))
    }

    fn with_condition(
        driver: Arc<dyn DriverPort>,
        locator: Locator,
        role: &'static str,
        resolve_when: ResolveWhen,
    ) -> Self {
        let timing = Timing::default();
        Self {
            driver,
            locator,
            role,
            resolve_when,
            timing,
            timeout: timing.element_wait,
            waiter: Waiter::new(timing.poll),
            last_resolved: None,
        }
    }

    /// Replace the timing configuration; the interaction budget follows the
    /// new `element_wait` unless overridden afterwards.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self.timeout = timing.element_wait;
        self.waiter = Waiter::new(timing.poll);
        self
    }

    /// Override the interaction budget for this handle alone.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_role(mut self, role: &'static str) -> Self {
        self.role = role;
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The element the last resolution attempt produced, if any. Purely
    /// diagnostic; never reused for interaction.
    pub fn last_resolved(&self) -> Option<&ElementRef> {
        self.last_resolved.as_ref()
    }

    /// Run one interaction under the retry loop.
    ///
    /// Resolution and the action together form one attempt; attempts repeat
    /// until one succeeds or the budget runs out. The first attempt always
    /// runs, even with a zero budget. Failures outside the transient set
    /// abort immediately.
    pub async fn interact<A: Action>(&mut self, mut action: A) -> Result<A::Output, EngineError> {
        let interaction = Uuid::new_v4();
        let deadline = Instant::now() + self.timeout;
        let mut last_miss: Option<Retry> = None;
        loop {
            match self.attempt(&mut action).await {
                Attempt::Done(output) => {
                    debug!(
                        %interaction,
                        action = action.describe(),
                        locator = %self.locator,
                        "interaction complete"
                    );
                    return Ok(output);
                }
                Attempt::Abort(err) => {
                    warn!(
                        %interaction,
                        action = action.describe(),
                        locator = %self.locator,
                        %err,
                        "interaction aborted"
                    );
                    return Err(err.into());
                }
                Attempt::Again(kind) => {
                    debug!(
                        %interaction,
                        action = action.describe(),
                        locator = %self.locator,
                        reason = kind.describe(),
                        "retrying"
                    );
                    last_miss = Some(kind);
                }
            }
            sleep(self.waiter.poll()).await;
            if Instant::now() > deadline {
                warn!(
                    %interaction,
                    action = action.describe(),
                    locator = %self.locator,
                    reason = last_miss.map(Retry::describe).unwrap_or("none"),
                    "interaction timed out"
                );
                return Err(EngineError::timeout(
                    self.role,
                    action.describe(),
                    self.locator.clone(),
                    self.timeout,
                    self.last_resolved.as_ref().map(|el| el.to_string()),
                    action.last_value(),
                ));
            }
        }
    }

    async fn attempt<A: Action>(&mut self, action: &mut A) -> Attempt<A::Output> {
        let target = match self.resolve_once().await {
            Ok(target) => target,
            Err(WaitError::Timeout) => return Attempt::Again(Retry::Missing),
            Err(WaitError::Driver(err)) => return Attempt::Abort(err),
        };
        Attempt::classify(action.run(self.driver.as_ref(), &target).await)
    }

    /// One resolution attempt, bounded by the short internal probe budget.
    async fn resolve_once(&mut self) -> Result<ElementRef, WaitError> {
        let driver = Arc::clone(&self.driver);
        let locator = self.locator.clone();
        let when = self.resolve_when;
        let found = self
            .waiter
            .until(self.timing.resolve_probe, move || {
                probe_one(Arc::clone(&driver), locator.clone(), when)
            })
            .await?;
        self.last_resolved = Some(found.clone());
        Ok(found)
    }

    /// Wait for the handle to resolve, spending the full interaction budget.
    pub async fn on_page(&mut self) -> Result<(), EngineError> {
        let driver = Arc::clone(&self.driver);
        let locator = self.locator.clone();
        let when = self.resolve_when;
        match self
            .waiter
            .until(self.timeout, move || {
                probe_one(Arc::clone(&driver), locator.clone(), when)
            })
            .await
        {
            Ok(found) => {
                self.last_resolved = Some(found);
                Ok(())
            }
            Err(WaitError::Timeout) => Err(EngineError::timeout(
                self.role,
                "resolve",
                self.locator.clone(),
                self.timeout,
                self.last_resolved.as_ref().map(|el| el.to_string()),
                None,
            )),
            Err(WaitError::Driver(err)) => Err(err.into()),
        }
    }

    /// True if nothing matched the locator for the whole `budget`.
    pub async fn absent_for(&self, budget: Duration) -> Result<bool, EngineError> {
        let driver = Arc::clone(&self.driver);
        let locator = self.locator.clone();
        let when = self.resolve_when;
        self.waiter
            .until_none(budget, move || {
                probe_one(Arc::clone(&driver), locator.clone(), when)
            })
            .await
            .map_err(Into::into)
    }

    /// True once `until` passes with the element still resolving on every
    /// poll; false the moment it stops resolving.
    pub async fn present_until(&self, until: DateTime<Utc>) -> Result<bool, EngineError> {
        let driver = Arc::clone(&self.driver);
        let locator = self.locator.clone();
        let when = self.resolve_when;
        self.waiter
            .until_deadline(until, move || {
                probe_one(Arc::clone(&driver), locator.clone(), when)
            })
            .await
            .map_err(Into::into)
    }

    // Typed accessors. Each builds one action and defers to the retry loop.

    pub async fn click(&mut self) -> Result<(), EngineError> {
        self.interact(Click).await
    }

    pub async fn clear(&mut self) -> Result<(), EngineError> {
        self.interact(Clear).await
    }

    pub async fn send_keys(&mut self, text: &str) -> Result<(), EngineError> {
        self.interact(SendKeys {
            text: text.to_owned(),
        })
        .await
    }

    pub async fn submit(&mut self) -> Result<(), EngineError> {
        self.interact(Submit).await
    }

    pub async fn text(&mut self) -> Result<String, EngineError> {
        self.interact(ReadText::default()).await
    }

    pub async fn attribute(&mut self, name: &str) -> Result<Option<String>, EngineError> {
        self.interact(ReadAttribute::new(name)).await
    }

    pub async fn property(&mut self, name: &str) -> Result<Option<String>, EngineError> {
        self.interact(ReadProperty::new(name)).await
    }

    /// The live `value` property of an input.
    pub async fn value(&mut self) -> Result<Option<String>, EngineError> {
        self.property(VALUE_PROPERTY).await
    }

    pub async fn is_selected(&mut self) -> Result<bool, EngineError> {
        self.interact(IsSelected::default()).await
    }

    pub async fn is_enabled(&mut self) -> Result<bool, EngineError> {
        self.interact(IsEnabled::default()).await
    }

    pub async fn size(&mut self) -> Result<ElemSize, EngineError> {
        self.interact(ReadSize::default()).await
    }

    pub async fn right_click(&mut self) -> Result<(), EngineError> {
        self.interact(ContextClick).await
    }

    /// Drag this element onto `target`.
    pub async fn drag_to(&mut self, target: &mut ElementHandle) -> Result<(), EngineError> {
        target.on_page().await?;
        let dest = target
            .last_resolved
            .clone()
            .ok_or_else(|| DriverError::Protocol("drop target did not resolve".into()))?;
        self.interact(DragTo { dest }).await
    }

    /// Wait for the text to equal `expected` (or become non-empty when
    /// `None`). Timing out is an answer, not an error.
    pub async fn wait_text(&mut self, expected: Option<&str>) -> Result<bool, EngineError> {
        match self
            .interact(ExpectText::new(expected.map(str::to_owned)))
            .await
        {
            Ok(()) => Ok(true),
            Err(EngineError::Timeout { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Wait for the text to move away from its value at call time.
    pub async fn wait_text_changed(&mut self) -> Result<bool, EngineError> {
        match self.interact(TextChanged::default()).await {
            Ok(()) => Ok(true),
            Err(EngineError::Timeout { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }
}

async fn probe_one(
    driver: Arc<dyn DriverPort>,
    locator: Locator,
    when: ResolveWhen,
) -> Result<Option<ElementRef>, DriverError> {
    let el = driver.find_element(&locator).await?;
    match when {
        ResolveWhen::Present => Ok(Some(el)),
        ResolveWhen::Clickable => Ok(driver.is_enabled(&el).await?.then_some(el)),
    }
}

/// Lazy handle to a collection of elements, resolved as a whole ("all
/// present", meaning at least one match) on every access.
pub struct ElementsHandle {
    driver: Arc<dyn DriverPort>,
    locator: Locator,
    role: &'static str,
    timing: Timing,
    timeout: Duration,
    waiter: Waiter,
    /// Size of the last successful resolution. Diagnostic only.
    last_resolved: Option<usize>,
}

impl ElementsHandle {
    pub fn new(driver: Arc<dyn DriverPort>, locator: Locator) -> Self {
        let timing = Timing::default();
        Self {
            driver,
            locator,
            role: "collection",
            timing,
            timeout: timing.element_wait,
            waiter: Waiter::new(timing.poll),
            last_resolved: None,
        }
    }

    pub fn from_template(
        driver: Arc<dyn DriverPort>,
        template: &LocatorTemplate,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(driver, template.fixed()?))
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self.timeout = timing.element_wait;
        self.waiter = Waiter::new(timing.poll);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_role(mut self, role: &'static str) -> Self {
        self.role = role;
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Run one collection interaction under the retry loop. Semantics match
    /// [`ElementHandle::interact`], with the short-read signal from a bulk
    /// read treated as one more reason to retry.
    pub async fn interact<A: ListAction>(&mut self, mut action: A) -> Result<A::Output, EngineError> {
        let interaction = Uuid::new_v4();
        let deadline = Instant::now() + self.timeout;
        let mut last_miss: Option<Retry> = None;
        loop {
            match self.attempt(&mut action).await {
                Attempt::Done(output) => {
                    debug!(
                        %interaction,
                        action = action.describe(),
                        locator = %self.locator,
                        "collection interaction complete"
                    );
                    return Ok(output);
                }
                Attempt::Abort(err) => {
                    warn!(
                        %interaction,
                        action = action.describe(),
                        locator = %self.locator,
                        %err,
                        "collection interaction aborted"
                    );
                    return Err(err.into());
                }
                Attempt::Again(kind) => {
                    debug!(
                        %interaction,
                        action = action.describe(),
                        locator = %self.locator,
                        reason = kind.describe(),
                        "retrying"
                    );
                    last_miss = Some(kind);
                }
            }
            sleep(self.waiter.poll()).await;
            if Instant::now() > deadline {
                warn!(
                    %interaction,
                    action = action.describe(),
                    locator = %self.locator,
                    reason = last_miss.map(Retry::describe).unwrap_or("none"),
                    "collection interaction timed out"
                );
                return Err(EngineError::timeout(
                    self.role,
                    action.describe(),
                    self.locator.clone(),
                    self.timeout,
                    self.last_resolved.map(|n| format!("{n} elements")),
                    action.last_value(),
                ));
            }
        }
    }

    async fn attempt<A: ListAction>(&mut self, action: &mut A) -> Attempt<A::Output> {
        let targets = match self.resolve_once().await {
            Ok(targets) => targets,
            Err(WaitError::Timeout) => return Attempt::Again(Retry::Missing),
            Err(WaitError::Driver(err)) => return Attempt::Abort(err),
        };
        match action.run(self.driver.as_ref(), &targets).await {
            Ok(Some(output)) => Attempt::Done(output),
            Ok(None) => Attempt::Again(Retry::Pending),
            Err(ListInterrupt::Short { .. }) => Attempt::Again(Retry::ShortRead),
            Err(ListInterrupt::Driver(err)) => match Retry::from_transient(&err) {
                Some(kind) => Attempt::Again(kind),
                None => Attempt::Abort(err),
            },
        }
    }

    async fn resolve_once(&mut self) -> Result<Vec<ElementRef>, WaitError> {
        let driver = Arc::clone(&self.driver);
        let locator = self.locator.clone();
        let found = self
            .waiter
            .until(self.timing.resolve_probe, move || {
                probe_all(Arc::clone(&driver), locator.clone())
            })
            .await?;
        self.last_resolved = Some(found.len());
        Ok(found)
    }

    /// Number of elements currently matching the locator.
    pub async fn count(&mut self) -> Result<usize, EngineError> {
        self.interact(Count).await
    }

    /// Visible text of every element, in collection order.
    pub async fn text_list(&mut self) -> Result<Vec<String>, EngineError> {
        self.read_list(TextField).await
    }

    /// A named attribute of every element, in collection order.
    pub async fn attribute_list(
        &mut self,
        name: &str,
    ) -> Result<Vec<Option<String>>, EngineError> {
        self.read_list(AttributeField(name.to_owned())).await
    }

    /// A named property of every element, in collection order.
    pub async fn property_list(
        &mut self,
        name: &str,
    ) -> Result<Vec<Option<String>>, EngineError> {
        self.read_list(PropertyField(name.to_owned())).await
    }

    /// Checkpointed bulk read with a caller-supplied field reader.
    ///
    /// Either the complete, in-order sequence comes back or the call fails;
    /// partial progress survives retries but is never returned as a result.
    pub async fn read_list<R: FieldReader>(
        &mut self,
        reader: R,
    ) -> Result<Vec<R::Value>, EngineError> {
        self.interact(BulkRead::new(reader)).await
    }

    pub async fn click_by_index(&mut self, index: usize) -> Result<(), EngineError> {
        self.interact(ClickByIndex { index }).await
    }

    pub async fn is_selected_by_index(&mut self, index: usize) -> Result<bool, EngineError> {
        self.interact(IsSelectedByIndex::new(index)).await
    }
}

async fn probe_all(
    driver: Arc<dyn DriverPort>,
    locator: Locator,
) -> Result<Option<Vec<ElementRef>>, DriverError> {
    let els = driver.find_elements(&locator).await?;
    if els.is_empty() {
        Ok(None)
    } else {
        Ok(Some(els))
    }
}
