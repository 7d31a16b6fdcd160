use crate::browser::Viewport;
use serde::{Deserialize, Serialize};

/// Identifier assigned to an element by the most recent capture (1-based)
pub type ElementId = i64;

/// Maximum number of characters kept in an element label
pub const MAX_LABEL_CHARS: usize = 50;

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Bounding box of an element in viewport pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if the bounding box has a non-zero footprint
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Calculate the area of the bounding box
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// True when the box has a footprint and overlaps the viewport rectangle `[0, 0, W, H]`.
    ///
    /// Partial overlap counts; a box that only touches an edge does not.
    pub fn intersects_viewport(&self, viewport: Viewport) -> bool {
        self.is_visible()
            && self.bottom() > 0.0
            && self.y < f64::from(viewport.height)
            && self.right() > 0.0
            && self.x < f64::from(viewport.width)
    }
}

/// A visible interactive element found by a scan, before an id is assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementCandidate {
    pub bounds: BoundingBox,

    /// Lowercase tag name ("a", "button", "input", ...)
    pub tag: String,

    /// Input type for form controls, otherwise the tag name
    #[serde(rename = "type")]
    pub kind: String,

    /// Best-effort human readable text
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl ElementCandidate {
    pub fn new(tag: impl Into<String>, bounds: BoundingBox) -> Self {
        let tag = tag.into();
        Self {
            bounds,
            kind: tag.clone(),
            tag,
            label: String::new(),
            href: None,
            dom_id: None,
            class_name: None,
        }
    }

    /// Builder method: set the element type
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Builder method: set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder method: set href
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Attach an id, turning the candidate into a map entry
    pub fn into_element(self, id: ElementId) -> InteractiveElement {
        InteractiveElement {
            id,
            center: self.bounds.center(),
            bounds: self.bounds,
            tag: self.tag,
            kind: self.kind,
            label: self.label,
            href: self.href,
            dom_id: self.dom_id,
            class_name: self.class_name,
        }
    }
}

/// An element of the current element map.
///
/// Only valid for the capture that produced it: ids are reassigned on every scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveElement {
    pub id: ElementId,
    pub bounds: BoundingBox,
    pub center: Point,
    pub tag: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl InteractiveElement {
    /// One-line description for agents, e.g. `[3] button "Sign in"`
    pub fn to_simple_string(&self) -> String {
        let mut line = format!("[{}] {}", self.id, self.tag);

        if self.kind != self.tag {
            line.push_str(&format!(" type={}", self.kind));
        }

        if !self.label.is_empty() {
            line.push_str(&format!(" \"{}\"", self.label));
        }

        if let Some(href) = self.href.as_deref().filter(|h| !h.is_empty()) {
            line.push_str(&format!(" -> {}", href));
        }

        line
    }
}

/// Pick the label for an element: visible text, then placeholder, then
/// accessible label, then title. The winner is trimmed and truncated to
/// [`MAX_LABEL_CHARS`] characters.
pub fn resolve_label(text: &str, placeholder: &str, aria_label: &str, title: &str) -> String {
    [text, placeholder, aria_label, title]
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(|s| s.chars().take(MAX_LABEL_CHARS).collect::<String>().trim_end().to_string())
        .unwrap_or_default()
}
