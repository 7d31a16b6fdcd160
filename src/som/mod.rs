//! Set-of-Marks capture
//!
//! A capture takes a raw screenshot, scans the page for interactive
//! elements, numbers them, draws the numbers onto the screenshot and only
//! then publishes the new element map. If any step fails nothing is
//! published and the previous map stays current.

pub mod font;
pub mod interaction;
pub mod renderer;

pub use font::LabelFont;
pub use interaction::{ActionResult, ElementAction, resolve_and_act};
pub use renderer::{AnnotationRenderer, MarkStyle};

use crate::browser::{Page, Viewport};
use crate::dom::{ElementMap, ElementMapStore, scan_and_assign};
use crate::error::Result;
use std::sync::Arc;

/// Annotated screenshot plus the element map it shows
#[derive(Debug, Clone)]
pub struct AnnotatedCapture {
    /// PNG bytes with numbered marks
    pub image: Vec<u8>,

    /// The published map; ids in the image resolve against it
    pub map: Arc<ElementMap>,
}

/// Capture, annotate and publish.
///
/// The screenshot and the scan run back to back against the same page so
/// the geometry matches the pixels. Elements are filtered and marks scaled
/// against the viewport the page reports; `configured` is only used when
/// the page cannot tell.
pub fn capture_annotated(
    page: &dyn Page,
    configured: Viewport,
    renderer: &AnnotationRenderer,
    store: &ElementMapStore,
) -> Result<AnnotatedCapture> {
    let screenshot = page.screenshot()?;
    let viewport = page_viewport(page, configured)?;
    let map = scan_and_assign(page, viewport)?;
    let image = renderer.render(&screenshot, &map)?;
    let map = store.publish(map);

    log::debug!("Captured screenshot with {} elements", map.len());

    Ok(AnnotatedCapture { image, map })
}

fn page_viewport(page: &dyn Page, configured: Viewport) -> Result<Viewport> {
    match page.viewport_size()? {
        Some(measured) => {
            if measured != configured {
                log::debug!(
                    "Page viewport is {}x{}, configured {}x{}",
                    measured.width,
                    measured.height,
                    configured.width,
                    configured.height
                );
            }
            Ok(measured)
        }
        None => Ok(configured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::BoundingBox;
    use crate::testing::FakePage;
    use serde_json::json;

    fn renderer() -> AnnotationRenderer {
        AnnotationRenderer::with_font(LabelFont::builtin())
    }

    #[test]
    fn test_capture_publishes_map() {
        let viewport = Viewport::new(320, 240);
        let page = FakePage::new(viewport).with_elements(json!([
            { "x": 10.0, "y": 10.0, "width": 80.0, "height": 30.0, "tag": "button", "text": "Go" },
            { "x": 10.0, "y": -300.0, "width": 80.0, "height": 30.0, "tag": "a", "href": "/top" },
        ]));
        let store = ElementMapStore::new();

        let capture = capture_annotated(&page, viewport, &renderer(), &store).unwrap();

        assert_eq!(capture.map.len(), 1);
        let button = store.resolve(1).unwrap();
        assert_eq!(button.bounds, BoundingBox::new(10.0, 10.0, 80.0, 30.0));
        assert_eq!(button.label, "Go");
        assert_eq!(page.screenshot_count(), 1);
        assert_eq!(page.scan_count(), 1);

        let image = image::load_from_memory(&capture.image).unwrap();
        assert_eq!((image.width(), image.height()), (320, 240));
    }

    #[test]
    fn test_failed_render_publishes_nothing() {
        struct BrokenScreenshot(FakePage);

        impl Page for BrokenScreenshot {
            fn navigate(&self, url: &str) -> Result<()> {
                self.0.navigate(url)
            }
            fn url(&self) -> String {
                self.0.url()
            }
            fn title(&self) -> Result<String> {
                self.0.title()
            }
            fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
                self.0.evaluate(script)
            }
            fn screenshot(&self) -> Result<Vec<u8>> {
                Ok(b"truncated".to_vec())
            }
            fn click_at(&self, point: crate::dom::Point) -> Result<()> {
                self.0.click_at(point)
            }
            fn hover_at(&self, point: crate::dom::Point) -> Result<()> {
                self.0.hover_at(point)
            }
            fn type_text(&self, text: &str) -> Result<()> {
                self.0.type_text(text)
            }
            fn press_key(&self, key: &str) -> Result<()> {
                self.0.press_key(key)
            }
        }

        let viewport = Viewport::new(100, 100);
        let store = ElementMapStore::new();
        let good = FakePage::new(viewport).with_elements(json!([
            { "x": 1.0, "y": 1.0, "width": 10.0, "height": 10.0, "tag": "a" },
        ]));
        capture_annotated(&good, viewport, &renderer(), &store).unwrap();
        let before = store.current();

        let broken = BrokenScreenshot(FakePage::new(viewport).with_elements(json!([
            { "x": 1.0, "y": 1.0, "width": 10.0, "height": 10.0, "tag": "button" },
            { "x": 1.0, "y": 20.0, "width": 10.0, "height": 10.0, "tag": "button" },
        ])));
        let result = capture_annotated(&broken, viewport, &renderer(), &store);

        assert!(matches!(result, Err(crate::BrowserError::RenderFailed(_))));
        assert!(Arc::ptr_eq(&before, &store.current()));
        assert_eq!(store.resolve(1).unwrap().tag, "a");
    }

    #[test]
    fn test_marks_follow_the_page_viewport() {
        // the page area is shorter than the configured viewport
        let page = FakePage::new(Viewport::new(400, 220)).with_elements(json!([
            { "x": 100.0, "y": 150.0, "width": 100.0, "height": 40.0, "tag": "button", "text": "Pay" },
            { "x": 100.0, "y": 250.0, "width": 100.0, "height": 40.0, "tag": "button", "text": "Below" },
        ]));
        let store = ElementMapStore::new();

        let capture = capture_annotated(&page, Viewport::new(400, 300), &renderer(), &store).unwrap();

        assert_eq!(capture.map.viewport(), Viewport::new(400, 220));
        assert_eq!(capture.map.len(), 1);
        assert_eq!(capture.map.get(1).unwrap().label, "Pay");

        let image = image::load_from_memory(&capture.image).unwrap().to_rgba8();
        let centre = image.get_pixel(150, 170);
        assert!(centre[0] > centre[1] && centre[0] > centre[2], "centre not tinted: {:?}", centre);
        assert_eq!(*image.get_pixel(150, 124), crate::testing::FAKE_BACKGROUND);
    }

    #[test]
    fn test_repeat_capture_is_stable() {
        let viewport = Viewport::new(200, 200);
        let page = FakePage::new(viewport).with_elements(json!([
            { "x": 5.0, "y": 5.0, "width": 50.0, "height": 20.0, "tag": "button", "text": "One" },
            { "x": 5.0, "y": 50.0, "width": 50.0, "height": 20.0, "tag": "input", "placeholder": "Two" },
        ]));
        let store = ElementMapStore::new();
        let renderer = renderer();

        let first = capture_annotated(&page, viewport, &renderer, &store).unwrap();
        let second = capture_annotated(&page, viewport, &renderer, &store).unwrap();

        let strip = |map: &ElementMap| map.iter().map(|e| (e.id, e.label.clone(), e.bounds)).collect::<Vec<_>>();
        assert_eq!(strip(&first.map), strip(&second.map));
        assert_eq!(second.map.generation(), first.map.generation() + 1);
        assert_eq!(first.image, second.image);
    }
}
