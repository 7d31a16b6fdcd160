//! Element scanning and identifier assignment
//!
//! This module turns a live page into the numbered element list that the
//! Set-of-Marks overlay shows. It includes:
//! - InteractiveElement: one visible interactive element with its geometry
//! - scanner: page script plus pure visibility and label filtering
//! - ElementMap / ElementMapStore: id assignment and the current id → element mapping

pub mod element;
pub mod element_map;
pub mod scanner;

pub use element::{BoundingBox, ElementCandidate, ElementId, InteractiveElement, Point, resolve_label};
pub use element_map::{ElementMap, ElementMapStore};
pub use scanner::scan;

use crate::browser::{Page, Viewport};
use crate::error::Result;

/// Scan the page and assign ids, without publishing the result
pub fn scan_and_assign(page: &dyn Page, viewport: Viewport) -> Result<ElementMap> {
    let candidates = scan(page, viewport)?;
    Ok(ElementMap::assign(candidates, viewport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;
    use serde_json::json;

    #[test]
    fn test_scan_and_assign() {
        let page = FakePage::new(Viewport::new(400, 300)).with_elements(json!([
            { "x": 10.0, "y": 10.0, "width": 80.0, "height": 30.0, "tag": "button", "text": "OK" },
            { "x": 10.0, "y": -90.0, "width": 60.0, "height": 20.0, "tag": "a", "href": "https://example.com" },
            { "x": 10.0, "y": 60.0, "width": 80.0, "height": 30.0, "tag": "input", "type": "text", "placeholder": "Name" },
        ]));

        let map = scan_and_assign(&page, Viewport::new(400, 300)).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1).unwrap().label, "OK");
        assert_eq!(map.get(2).unwrap().label, "Name");
        assert_eq!(map.generation(), 0);
    }
}
