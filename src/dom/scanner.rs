//! Element scanner
//!
//! A page script enumerates interactive elements in selector-list order,
//! deduplicated by element identity. Everything after that (visibility
//! filtering, label resolution) happens here as pure functions over the
//! scan payload so it can be tested without a browser.

use crate::browser::{Page, Viewport};
use crate::dom::element::{BoundingBox, ElementCandidate, resolve_label};
use crate::error::{BrowserError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Page script returning the raw scan as a JSON string
pub const SCAN_SCRIPT: &str = include_str!("scan_elements.js");

/// One element as reported by the page script
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub tag: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub aria_label: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl RawElement {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    fn into_candidate(self) -> ElementCandidate {
        let bounds = self.bounds();
        let label = resolve_label(&self.text, &self.placeholder, &self.aria_label, &self.title);
        let kind = if self.kind.is_empty() { self.tag.clone() } else { self.kind };

        ElementCandidate {
            bounds,
            tag: self.tag,
            kind,
            label,
            href: non_empty(self.href),
            dom_id: self.id.and_then(non_empty),
            class_name: self.class_name.and_then(non_empty),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

/// Scan the live page for visible interactive elements.
///
/// The result is ordered by selector-list order, then document order; that
/// order becomes id order when the candidates are assigned.
pub fn scan(page: &dyn Page, viewport: Viewport) -> Result<Vec<ElementCandidate>> {
    let value = page.evaluate(SCAN_SCRIPT)?;
    let raw = parse_scan(value)?;
    let total = raw.len();
    let candidates = filter_candidates(raw, viewport);

    log::debug!(
        "Scanned {} interactive elements, {} visible in {}x{} viewport",
        total,
        candidates.len(),
        viewport.width,
        viewport.height
    );

    Ok(candidates)
}

/// Decode the scan script result.
///
/// The script returns a JSON string; an already-structured array is accepted as well.
pub fn parse_scan(value: Value) -> Result<Vec<RawElement>> {
    match value {
        Value::String(json_str) => serde_json::from_str(&json_str)
            .map_err(|e| BrowserError::DomParseFailed(format!("Failed to parse scan JSON: {}", e))),
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| BrowserError::DomParseFailed(format!("Failed to deserialize scan result: {}", e))),
        Value::Null => Err(BrowserError::DomParseFailed(
            "No value returned from element scan".to_string(),
        )),
        other => Err(BrowserError::DomParseFailed(format!(
            "Unexpected scan result: {}",
            other
        ))),
    }
}

/// Drop elements without an on-screen footprint and resolve labels, keeping input order
pub fn filter_candidates(raw: Vec<RawElement>, viewport: Viewport) -> Vec<ElementCandidate> {
    raw.into_iter()
        .filter(|el| el.bounds().intersects_viewport(viewport))
        .map(RawElement::into_candidate)
        .collect()
}
