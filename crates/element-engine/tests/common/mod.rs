//! Scripted in-memory driver for engine tests.
//!
//! Each operation consults a per-target script queue first and falls back to
//! a steady default, so tests can stage "fails once, then succeeds" and
//! "collection shrinks between resolutions" timelines. Call counters let
//! tests assert exactly how often the engine hit the wire.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use driver_port::{DriverPort, ElementRef, Gestures};
use pagewright_core_types::{DriverError, ElemSize, Locator};

#[derive(Default)]
#[allow(dead_code)]
struct Inner {
    find: HashMap<String, VecDeque<Result<ElementRef, DriverError>>>,
    find_default: HashMap<String, ElementRef>,
    find_calls: usize,

    collections: VecDeque<Vec<ElementRef>>,
    collection_default: Vec<ElementRef>,
    find_all_calls: usize,

    text: HashMap<String, VecDeque<Result<String, DriverError>>>,
    text_default: HashMap<String, String>,
    text_calls: HashMap<String, usize>,

    attributes: HashMap<(String, String), Option<String>>,
    properties: HashMap<(String, String), Option<String>>,
    enabled: HashMap<String, bool>,
    selected: HashMap<String, bool>,

    clicks: HashMap<String, usize>,
    click_scripts: HashMap<String, VecDeque<Result<(), DriverError>>>,
    keys_sent: Vec<(String, String)>,
    cleared: Vec<String>,
    submitted: Vec<String>,
    performed: Vec<Gestures>,

    url: String,
    page_title: String,
}

#[derive(Default)]
pub struct FakeDriver {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake driver poisoned")
    }

    pub fn set_element(&self, selector: &str, id: &str) {
        self.lock()
            .find_default
            .insert(selector.into(), ElementRef(id.into()));
    }

    pub fn script_find(&self, selector: &str, result: Result<&str, DriverError>) {
        self.lock()
            .find
            .entry(selector.into())
            .or_default()
            .push_back(result.map(|id| ElementRef(id.into())));
    }

    pub fn set_collection(&self, ids: &[&str]) {
        self.lock().collection_default =
            ids.iter().map(|id| ElementRef((*id).into())).collect();
    }

    pub fn script_collection(&self, ids: &[&str]) {
        let snapshot = ids.iter().map(|id| ElementRef((*id).into())).collect();
        self.lock().collections.push_back(snapshot);
    }

    pub fn set_text(&self, id: &str, text: &str) {
        self.lock().text_default.insert(id.into(), text.into());
    }

    pub fn script_text(&self, id: &str, result: Result<&str, DriverError>) {
        self.lock()
            .text
            .entry(id.into())
            .or_default()
            .push_back(result.map(str::to_owned));
    }

    pub fn set_attribute(&self, id: &str, name: &str, value: Option<&str>) {
        self.lock()
            .attributes
            .insert((id.into(), name.into()), value.map(str::to_owned));
    }

    pub fn set_property(&self, id: &str, name: &str, value: Option<&str>) {
        self.lock()
            .properties
            .insert((id.into(), name.into()), value.map(str::to_owned));
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) {
        self.lock().enabled.insert(id.into(), enabled);
    }

    pub fn set_selected(&self, id: &str, selected: bool) {
        self.lock().selected.insert(id.into(), selected);
    }

    pub fn script_click(&self, id: &str, result: Result<(), DriverError>) {
        self.lock()
            .click_scripts
            .entry(id.into())
            .or_default()
            .push_back(result);
    }

    pub fn find_calls(&self) -> usize {
        self.lock().find_calls
    }

    pub fn find_all_calls(&self) -> usize {
        self.lock().find_all_calls
    }

    pub fn text_reads(&self, id: &str) -> usize {
        self.lock().text_calls.get(id).copied().unwrap_or(0)
    }

    pub fn clicks(&self, id: &str) -> usize {
        self.lock().clicks.get(id).copied().unwrap_or(0)
    }

    pub fn keys_sent(&self) -> Vec<(String, String)> {
        self.lock().keys_sent.clone()
    }

    pub fn performed(&self) -> Vec<Gestures> {
        self.lock().performed.clone()
    }
}

#[async_trait]
impl DriverPort for FakeDriver {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef, DriverError> {
        let mut inner = self.lock();
        inner.find_calls += 1;
        if let Some(queue) = inner.find.get_mut(locator.selector()) {
            if let Some(scripted) = queue.pop_front() {
                return scripted;
            }
        }
        inner
            .find_default
            .get(locator.selector())
            .cloned()
            .ok_or_else(|| DriverError::NotFound(locator.to_string()))
    }

    async fn find_elements(&self, _locator: &Locator) -> Result<Vec<ElementRef>, DriverError> {
        let mut inner = self.lock();
        inner.find_all_calls += 1;
        if let Some(snapshot) = inner.collections.pop_front() {
            return Ok(snapshot);
        }
        Ok(inner.collection_default.clone())
    }

    async fn click(&self, el: &ElementRef) -> Result<(), DriverError> {
        let mut inner = self.lock();
        *inner.clicks.entry(el.0.clone()).or_default() += 1;
        if let Some(queue) = inner.click_scripts.get_mut(&el.0) {
            if let Some(scripted) = queue.pop_front() {
                return scripted;
            }
        }
        Ok(())
    }

    async fn clear(&self, el: &ElementRef) -> Result<(), DriverError> {
        self.lock().cleared.push(el.0.clone());
        Ok(())
    }

    async fn send_keys(&self, el: &ElementRef, text: &str) -> Result<(), DriverError> {
        self.lock().keys_sent.push((el.0.clone(), text.to_owned()));
        Ok(())
    }

    async fn text(&self, el: &ElementRef) -> Result<String, DriverError> {
        let mut inner = self.lock();
        *inner.text_calls.entry(el.0.clone()).or_default() += 1;
        if let Some(queue) = inner.text.get_mut(&el.0) {
            if let Some(scripted) = queue.pop_front() {
                return scripted;
            }
        }
        inner
            .text_default
            .get(&el.0)
            .cloned()
            .ok_or_else(|| DriverError::Stale(el.0.clone()))
    }

    async fn attribute(
        &self,
        el: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(self
            .lock()
            .attributes
            .get(&(el.0.clone(), name.to_owned()))
            .cloned()
            .flatten())
    }

    async fn property(&self, el: &ElementRef, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self
            .lock()
            .properties
            .get(&(el.0.clone(), name.to_owned()))
            .cloned()
            .flatten())
    }

    async fn is_selected(&self, el: &ElementRef) -> Result<bool, DriverError> {
        Ok(self.lock().selected.get(&el.0).copied().unwrap_or(false))
    }

    async fn is_enabled(&self, el: &ElementRef) -> Result<bool, DriverError> {
        Ok(self.lock().enabled.get(&el.0).copied().unwrap_or(true))
    }

    async fn submit(&self, el: &ElementRef) -> Result<(), DriverError> {
        self.lock().submitted.push(el.0.clone());
        Ok(())
    }

    async fn size(&self, _el: &ElementRef) -> Result<ElemSize, DriverError> {
        Ok(ElemSize {
            width: 10,
            height: 10,
        })
    }

    async fn perform(&self, gestures: &Gestures) -> Result<(), DriverError> {
        self.lock().performed.push(gestures.clone());
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.lock().url = url.to_owned();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.lock().url.clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok(self.lock().page_title.clone())
    }

    async fn refresh(&self) -> Result<(), DriverError> {
        Ok(())
    }
}
