use crate::browser::Viewport;
use crate::dom::element::{ElementCandidate, ElementId, InteractiveElement};
use crate::error::{BrowserError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Map of element ids to elements for one capture.
/// Uses IndexMap to preserve id order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementMap {
    /// Map from id to element
    elements: IndexMap<ElementId, InteractiveElement>,

    /// Viewport the elements were scanned against
    viewport: Viewport,

    /// Publication counter set by the store, 0 until published
    generation: u64,
}

impl ElementMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign ids `1..=N` to the candidates in input order
    pub fn assign(candidates: Vec<ElementCandidate>, viewport: Viewport) -> Self {
        let elements = candidates
            .into_iter()
            .zip(1..)
            .map(|(candidate, id)| (id, candidate.into_element(id)))
            .collect();

        Self { elements, viewport, generation: 0 }
    }

    /// Get element by id
    pub fn get(&self, id: ElementId) -> Option<&InteractiveElement> {
        self.elements.get(&id)
    }

    /// Check if id exists
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterate over all elements in id order
    pub fn iter(&self) -> impl Iterator<Item = &InteractiveElement> {
        self.elements.values()
    }

    /// Get all ids
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.elements.keys()
    }

    /// Agent-readable listing, one element per line
    pub fn describe(&self) -> String {
        if self.elements.is_empty() {
            return "No interactive elements visible.".to_string();
        }

        self.iter()
            .map(InteractiveElement::to_simple_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Export to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.elements)
    }
}

/// Holder of the current element map.
///
/// Maps are published whole: readers get an `Arc` snapshot of exactly one
/// capture and never see entries from two scans at once. Clones share the
/// same underlying map.
#[derive(Debug, Clone, Default)]
pub struct ElementMapStore {
    current: Arc<RwLock<Arc<ElementMap>>>,
}

impl ElementMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current map
    pub fn current(&self) -> Arc<ElementMap> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the current map with a fully built one, returning the published snapshot
    pub fn publish(&self, mut map: ElementMap) -> Arc<ElementMap> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        map.generation = guard.generation + 1;
        let published = Arc::new(map);
        *guard = published.clone();
        published
    }

    /// Replace the current map with an empty one so every old id fails to resolve
    pub fn clear(&self) {
        let viewport = self.current().viewport;
        self.publish(ElementMap::assign(Vec::new(), viewport));
    }

    /// Look up an id in the current map. No fallback or fuzzy matching.
    pub fn resolve(&self, id: ElementId) -> Result<InteractiveElement> {
        self.resolve_in(id, None)
    }

    /// Look up an id, pinned to the capture it was read from.
    ///
    /// With `Some(generation)` the id only resolves while that capture is
    /// still the current map; once a newer capture replaced it, the id fails
    /// even if the new map reuses the number for another element.
    pub fn resolve_in(&self, id: ElementId, generation: Option<u64>) -> Result<InteractiveElement> {
        lookup(&self.current(), id, generation).cloned()
    }
}

/// Find `id` in `map`, rejecting ids read from another generation
pub(crate) fn lookup(map: &ElementMap, id: ElementId, generation: Option<u64>) -> Result<&InteractiveElement> {
    if let Some(expected) = generation {
        if expected != map.generation() {
            log::debug!("Element {} is from capture {}, current is {}", id, expected, map.generation());
            return Err(BrowserError::ElementNotFound(id));
        }
    }
    map.get(id).ok_or(BrowserError::ElementNotFound(id))
}
