//! In-memory browser doubles
//!
//! [`FakeBackend`] and [`FakePage`] implement the capability traits without a
//! browser, so the capture → resolve → act pipeline can be exercised in tests
//! and by downstream crates. The page answers the element scan script with a
//! configurable payload and records every input it receives.

use crate::browser::{BrowserBackend, BrowserContext, LaunchOptions, Page, Viewport};
use crate::dom::Point;
use crate::dom::scanner::SCAN_SCRIPT;
use crate::error::{BrowserError, Result};
use image::{ImageOutputFormat, Rgba, RgbaImage};
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Background colour of fake screenshots
pub const FAKE_BACKGROUND: Rgba<u8> = Rgba([240, 240, 240, 255]);

/// Input received by a [`FakePage`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedAction {
    Navigate(String),
    Click(Point),
    Hover(Point),
    Type(String),
    Key(String),
    Script(String),
}

#[derive(Debug)]
struct FakePageState {
    url: String,
    title: String,
    elements: Value,
    script_result: Value,
    actions: Vec<RecordedAction>,
    screenshots: usize,
    scans: usize,
    click_times_out: bool,
    title_fails: bool,
}

/// A page whose content is a fixed element scan.
///
/// Its viewport is both the reported page size and the screenshot size.
#[derive(Debug)]
pub struct FakePage {
    viewport: Viewport,
    state: Mutex<FakePageState>,
}

impl FakePage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            state: Mutex::new(FakePageState {
                url: "about:blank".to_string(),
                title: String::new(),
                elements: Value::Array(Vec::new()),
                script_result: Value::Bool(true),
                actions: Vec::new(),
                screenshots: 0,
                scans: 0,
                click_times_out: false,
                title_fails: false,
            }),
        }
    }

    /// Builder method: set the raw scan payload (an array of element objects)
    pub fn with_elements(self, elements: Value) -> Self {
        self.set_elements(elements);
        self
    }

    /// Builder method: value returned by every script other than the element scan
    pub fn with_script_result(self, value: Value) -> Self {
        self.state().script_result = value;
        self
    }

    /// Builder method: make clicks fail with a timeout
    pub fn with_click_timeout(self) -> Self {
        self.state().click_times_out = true;
        self
    }

    /// Builder method: make reading the title fail
    pub fn with_failing_title(self) -> Self {
        self.state().title_fails = true;
        self
    }

    /// Replace the page content, as if the DOM had changed
    pub fn set_elements(&self, elements: Value) {
        self.state().elements = elements;
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Everything the page received, in order
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.state().actions.clone()
    }

    pub fn screenshot_count(&self) -> usize {
        self.state().screenshots
    }

    pub fn scan_count(&self) -> usize {
        self.state().scans
    }

    fn state(&self) -> MutexGuard<'_, FakePageState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, action: RecordedAction) {
        self.state().actions.push(action);
    }
}

impl Page for FakePage {
    fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        state.url = url.to_string();
        state.actions.push(RecordedAction::Navigate(url.to_string()));
        Ok(())
    }

    fn url(&self) -> String {
        self.state().url.clone()
    }

    fn title(&self) -> Result<String> {
        let state = self.state();
        if state.title_fails {
            return Err(BrowserError::EvaluationFailed("Failed to read title: target closed".to_string()));
        }
        Ok(state.title.clone())
    }

    fn evaluate(&self, script: &str) -> Result<Value> {
        let mut state = self.state();
        if script == SCAN_SCRIPT {
            state.scans += 1;
            return Ok(Value::String(state.elements.to_string()));
        }

        state.actions.push(RecordedAction::Script(script.to_string()));
        Ok(state.script_result.clone())
    }

    fn viewport_size(&self) -> Result<Option<Viewport>> {
        Ok(Some(self.viewport))
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        self.state().screenshots += 1;

        let image = RgbaImage::from_pixel(self.viewport.width, self.viewport.height, FAKE_BACKGROUND);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;
        Ok(bytes)
    }

    fn click_at(&self, point: Point) -> Result<()> {
        if self.state().click_times_out {
            return Err(BrowserError::ActionTimeout {
                action: "click".to_string(),
                reason: "The event waited for never came".to_string(),
            });
        }
        self.record(RecordedAction::Click(point));
        Ok(())
    }

    fn hover_at(&self, point: Point) -> Result<()> {
        self.record(RecordedAction::Hover(point));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.record(RecordedAction::Type(text.to_string()));
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.record(RecordedAction::Key(key.to_string()));
        Ok(())
    }
}

/// Backend handing out contexts around one shared [`FakePage`]
#[derive(Debug)]
pub struct FakeBackend {
    page: Arc<FakePage>,
    launches: AtomicUsize,
    closes: Arc<AtomicUsize>,
    fail_launch: bool,
    fail_new_page: bool,
    fail_close: bool,
    has_initial_page: bool,
}

impl FakeBackend {
    pub fn new(page: Arc<FakePage>) -> Self {
        Self {
            page,
            launches: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_launch: false,
            fail_new_page: false,
            fail_close: false,
            has_initial_page: true,
        }
    }

    /// Builder method: every launch fails
    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Builder method: contexts start without pages and cannot open one
    pub fn failing_new_page(mut self) -> Self {
        self.fail_new_page = true;
        self.has_initial_page = false;
        self
    }

    /// Builder method: contexts start without pages, forcing `new_page`
    pub fn without_initial_page(mut self) -> Self {
        self.has_initial_page = false;
        self
    }

    /// Builder method: closing a context reports an error
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn page(&self) -> Arc<FakePage> {
        self.page.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl BrowserBackend for FakeBackend {
    fn launch(&self, _options: &LaunchOptions) -> Result<Box<dyn BrowserContext>> {
        self.launches.fetch_add(1, Ordering::SeqCst);

        if self.fail_launch {
            return Err(BrowserError::SessionStartFailed("browser executable not found".to_string()));
        }

        Ok(Box::new(FakeContext {
            page: self.page.clone(),
            closes: self.closes.clone(),
            has_initial_page: self.has_initial_page,
            fail_new_page: self.fail_new_page,
            fail_close: self.fail_close,
        }))
    }
}

struct FakeContext {
    page: Arc<FakePage>,
    closes: Arc<AtomicUsize>,
    has_initial_page: bool,
    fail_new_page: bool,
    fail_close: bool,
}

impl BrowserContext for FakeContext {
    fn pages(&self) -> Result<Vec<Arc<dyn Page>>> {
        if self.has_initial_page {
            Ok(vec![self.page.clone() as Arc<dyn Page>])
        } else {
            Ok(Vec::new())
        }
    }

    fn new_page(&self) -> Result<Arc<dyn Page>> {
        if self.fail_new_page {
            return Err(BrowserError::SessionStartFailed("Failed to create tab".to_string()));
        }
        Ok(self.page.clone())
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(BrowserError::ActionFailed {
                action: "close".to_string(),
                reason: "target crashed".to_string(),
            });
        }
        Ok(())
    }
}
