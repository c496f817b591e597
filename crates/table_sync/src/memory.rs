//! In-memory page hosts used by tests and the headless CLI.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, RwLock},
};

use shared::domain::{RegionId, UpdateTarget};
use shared::error::MalformedFragment;
use url::Url;

use crate::{
    host::{BrowserHistory, LiveDocument, Navigator, RegionNode, SearchInput},
    swapper::parse_regions,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveRegion {
    markup: String,
    busy: bool,
}

#[derive(Debug, Default)]
pub struct MemoryDocument {
    regions: Mutex<BTreeMap<RegionId, LiveRegion>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(self, id: impl Into<String>, markup: impl Into<String>) -> Self {
        lock(&self.regions).insert(
            RegionId::new(id),
            LiveRegion {
                markup: markup.into(),
                busy: false,
            },
        );
        self
    }

    /// Builds a document from a full page, keeping only the regions of `target`.
    pub fn from_html(html: &str, target: &UpdateTarget) -> Result<Self, MalformedFragment> {
        let document = Self::new();
        for node in parse_regions(html, target)? {
            lock(&document.regions).insert(
                node.id,
                LiveRegion {
                    markup: node.markup,
                    busy: false,
                },
            );
        }
        Ok(document)
    }

    pub fn is_busy(&self, id: &RegionId) -> bool {
        lock(&self.regions).get(id).is_some_and(|region| region.busy)
    }

    /// Simulates the page navigating away underneath a pending update.
    pub fn remove_region(&self, id: &RegionId) -> Option<String> {
        lock(&self.regions).remove(id).map(|region| region.markup)
    }
}

impl LiveDocument for MemoryDocument {
    fn has_region(&self, id: &RegionId) -> bool {
        lock(&self.regions).contains_key(id)
    }

    fn region_markup(&self, id: &RegionId) -> Option<String> {
        lock(&self.regions).get(id).map(|region| region.markup.clone())
    }

    fn replace_region(&self, node: RegionNode) {
        let mut regions = lock(&self.regions);
        if let Some(region) = regions.get_mut(&node.id) {
            // Fresh nodes carry none of the old node's inline style.
            *region = LiveRegion {
                markup: node.markup,
                busy: false,
            };
        }
    }

    fn set_busy(&self, id: &RegionId, busy: bool) {
        if let Some(region) = lock(&self.regions).get_mut(id) {
            region.busy = busy;
        }
    }
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<Url>,
    index: usize,
}

/// Session history with a cursor, like a single browser tab.
#[derive(Debug)]
pub struct SessionHistory {
    stack: Mutex<HistoryStack>,
}

impl SessionHistory {
    pub fn new(initial: Url) -> Self {
        Self {
            stack: Mutex::new(HistoryStack {
                entries: vec![initial],
                index: 0,
            }),
        }
    }

    pub fn entries(&self) -> Vec<Url> {
        lock(&self.stack).entries.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.stack).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn back(&self) -> Option<Url> {
        let mut stack = lock(&self.stack);
        if stack.index == 0 {
            return None;
        }
        stack.index -= 1;
        Some(stack.entries[stack.index].clone())
    }

    pub fn forward(&self) -> Option<Url> {
        let mut stack = lock(&self.stack);
        if stack.index + 1 >= stack.entries.len() {
            return None;
        }
        stack.index += 1;
        Some(stack.entries[stack.index].clone())
    }
}

impl BrowserHistory for SessionHistory {
    fn current_url(&self) -> Url {
        let stack = lock(&self.stack);
        stack.entries[stack.index].clone()
    }

    fn push(&self, url: &Url) {
        let mut stack = lock(&self.stack);
        let next = stack.index + 1;
        stack.entries.truncate(next);
        stack.entries.push(url.clone());
        stack.index = next;
    }

    fn replace(&self, url: &Url) {
        let mut stack = lock(&self.stack);
        let index = stack.index;
        stack.entries[index] = url.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRecord {
    Navigate(Url),
    Reload,
}

/// Records full navigations instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    records: Mutex<Vec<NavigationRecord>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<NavigationRecord> {
        lock(&self.records).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) {
        lock(&self.records).push(NavigationRecord::Navigate(url.clone()));
    }

    fn reload(&self) {
        lock(&self.records).push(NavigationRecord::Reload);
    }
}

#[derive(Debug, Default)]
pub struct InputField {
    value: RwLock<String>,
}

impl InputField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(value.into()),
        }
    }

    pub fn set(&self, value: impl Into<String>) {
        let mut guard = self
            .value
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = value.into();
    }
}

impl SearchInput for InputField {
    fn value(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
