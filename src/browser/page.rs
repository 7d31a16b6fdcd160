use crate::browser::config::Viewport;
use crate::dom::Point;
use crate::error::{BrowserError, Result};
use headless_chrome::Tab;
use headless_chrome::browser::tab::point::Point as ChromePoint;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Reports the layout viewport, which is what the screenshot shows
pub const VIEWPORT_SCRIPT: &str =
    "JSON.stringify({ width: window.innerWidth, height: window.innerHeight })";

/// Capabilities of one live page.
///
/// The Set-of-Marks pipeline only talks to the browser through this trait,
/// so a test double can stand in for Chrome.
pub trait Page: Send + Sync {
    /// Navigate and wait for the load to finish
    fn navigate(&self, url: &str) -> Result<()>;

    /// Current URL
    fn url(&self) -> String;

    /// Document title
    fn title(&self) -> Result<String>;

    /// Run a script and return its value
    fn evaluate(&self, script: &str) -> Result<Value>;

    /// Capture the current viewport as PNG bytes
    fn screenshot(&self) -> Result<Vec<u8>>;

    /// Viewport size in CSS pixels as the page measures it.
    ///
    /// `None` when the page gives no usable answer. Browser chrome in headed
    /// mode makes this smaller than the window size.
    fn viewport_size(&self) -> Result<Option<Viewport>> {
        Ok(parse_viewport(self.evaluate(VIEWPORT_SCRIPT)?))
    }

    /// Dispatch a mouse click at a viewport point
    fn click_at(&self, point: Point) -> Result<()>;

    /// Move the mouse to a viewport point
    fn hover_at(&self, point: Point) -> Result<()>;

    /// Type text into the focused element
    fn type_text(&self, text: &str) -> Result<()>;

    /// Press a named key ("Enter", "Tab", "ArrowDown", ...)
    fn press_key(&self, key: &str) -> Result<()>;

    /// Scroll the window by a pixel offset
    fn scroll_by(&self, dx: f64, dy: f64) -> Result<()> {
        self.evaluate(&format!("(function() {{ window.scrollBy({}, {}); return true; }})()", dx, dy))?;
        Ok(())
    }
}

fn parse_viewport(value: Value) -> Option<Viewport> {
    let viewport: Viewport = match value {
        Value::String(json) => serde_json::from_str(&json).ok()?,
        other => serde_json::from_value(other).ok()?,
    };
    (viewport.width > 0 && viewport.height > 0).then_some(viewport)
}

/// [`Page`] backed by a headless_chrome tab
pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    pub fn new(tab: Arc<Tab>, action_timeout: Duration) -> Self {
        tab.set_default_timeout(action_timeout);
        Self { tab }
    }

    /// Get the underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl Page for ChromePage {
    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::from_action("navigate", &e))?;

        Ok(())
    }

    fn url(&self) -> String {
        self.tab.get_url()
    }

    fn title(&self) -> Result<String> {
        self.tab
            .get_title()
            .map_err(|e| BrowserError::EvaluationFailed(format!("Failed to read title: {}", e)))
    }

    fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))
    }

    fn click_at(&self, point: Point) -> Result<()> {
        self.tab
            .click_point(ChromePoint { x: point.x, y: point.y })
            .map_err(|e| BrowserError::from_action("click", &e))?;
        Ok(())
    }

    fn hover_at(&self, point: Point) -> Result<()> {
        self.tab
            .move_mouse_to_point(ChromePoint { x: point.x, y: point.y })
            .map_err(|e| BrowserError::from_action("hover", &e))?;
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.tab
            .type_str(text)
            .map_err(|e| BrowserError::from_action("type_text", &e))?;
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .map_err(|e| BrowserError::from_action("press_key", &e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_viewport() {
        let reported = Value::String(r#"{"width":1280,"height":633}"#.to_string());
        assert_eq!(parse_viewport(reported), Some(Viewport::new(1280, 633)));
        assert_eq!(parse_viewport(json!({ "width": 800, "height": 600 })), Some(Viewport::new(800, 600)));
    }

    #[test]
    fn test_unusable_viewport_is_none() {
        assert_eq!(parse_viewport(json!(true)), None);
        assert_eq!(parse_viewport(Value::Null), None);
        assert_eq!(parse_viewport(json!({ "width": 0, "height": 600 })), None);
        assert_eq!(parse_viewport(Value::String("undefined".to_string())), None);
    }
}
