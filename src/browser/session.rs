use crate::browser::backend::{BrowserBackend, BrowserContext, ChromeBackend};
use crate::browser::config::LaunchOptions;
use crate::browser::page::Page;
use crate::dom::{ElementId, ElementMap, ElementMapStore, InteractiveElement};
use crate::error::{BrowserError, Result};
use crate::som::{self, ActionResult, AnnotatedCapture, AnnotationRenderer, ElementAction};
use crate::browser::url::complete_url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Pause after history navigation so the new document can load
const HISTORY_SETTLE: Duration = Duration::from_millis(300);

/// Lifecycle of a [`BrowserSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Scroll direction for [`BrowserSession::scroll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    fn offset(self, amount: f64) -> (f64, f64) {
        match self {
            ScrollDirection::Up => (0.0, -amount),
            ScrollDirection::Down => (0.0, amount),
            ScrollDirection::Left => (-amount, 0.0),
            ScrollDirection::Right => (amount, 0.0),
        }
    }
}

/// The single browser session of the process.
///
/// Owns one persistent browsing context and one active page. The session
/// starts lazily on first use, may be stopped and started again, and tears
/// the browser down when dropped.
pub struct BrowserSession {
    options: LaunchOptions,
    backend: Arc<dyn BrowserBackend>,
    state: SessionState,
    context: Option<Box<dyn BrowserContext>>,
    page: Option<Arc<dyn Page>>,
    elements: ElementMapStore,
    renderer: AnnotationRenderer,
}

impl BrowserSession {
    /// Create a stopped session that launches Chrome on first use
    pub fn new(options: LaunchOptions) -> Self {
        Self::with_backend(options, Arc::new(ChromeBackend))
    }

    /// Create a stopped session around any [`BrowserBackend`]
    pub fn with_backend(options: LaunchOptions, backend: Arc<dyn BrowserBackend>) -> Self {
        Self {
            options,
            backend,
            state: SessionState::Stopped,
            context: None,
            page: None,
            elements: ElementMapStore::new(),
            renderer: AnnotationRenderer::new(),
        }
    }

    /// Builder method: replace the annotation renderer
    pub fn with_renderer(mut self, renderer: AnnotationRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Launch the browser and pick the active page.
    ///
    /// Calling this on a running session logs a warning and does nothing.
    /// If any step fails, whatever was created is torn down and the session
    /// is left stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.state == SessionState::Running {
            log::warn!("Browser already started");
            return Ok(());
        }

        self.state = SessionState::Starting;
        log::info!("Starting browser (headless={})", self.options.headless);

        match self.launch() {
            Ok(()) => {
                self.state = SessionState::Running;
                log::info!("Browser started");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start browser: {}", e);
                self.stop();
                Err(match e {
                    BrowserError::SessionStartFailed(reason) => BrowserError::SessionStartFailed(reason),
                    other => BrowserError::SessionStartFailed(other.to_string()),
                })
            }
        }
    }

    fn launch(&mut self) -> Result<()> {
        if let Some(dir) = &self.options.user_data_dir {
            std::fs::create_dir_all(dir)?;
        }

        let context = self.context.insert(self.backend.launch(&self.options)?);

        // A persistent profile usually opens with a blank page; reuse it
        let page = match context.pages()?.into_iter().next() {
            Some(page) => page,
            None => context.new_page()?,
        };

        self.page = Some(page);
        Ok(())
    }

    /// Close the page and the browser. Safe to call in any state.
    ///
    /// Teardown errors are logged and swallowed. Every id of the current
    /// element map stops resolving.
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped && self.context.is_none() {
            return;
        }

        self.state = SessionState::Stopping;
        self.page = None;

        if let Some(mut context) = self.context.take() {
            if let Err(e) = context.close() {
                log::warn!("Error while closing browser: {}", e);
            }
        }

        self.elements.clear();
        self.state = SessionState::Stopped;
        log::info!("Browser stopped");
    }

    /// Stop, then start again with the same options
    pub fn restart(&mut self) -> Result<()> {
        self.stop();
        self.start()
    }

    /// Start the session unless it is already running
    pub fn ensure_started(&mut self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }
        self.start()
    }

    pub fn is_started(&self) -> bool {
        self.state == SessionState::Running && self.page.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The active page, or [`BrowserError::SessionNotStarted`]
    pub fn active_page(&self) -> Result<Arc<dyn Page>> {
        match (&self.state, &self.page) {
            (SessionState::Running, Some(page)) => Ok(page.clone()),
            _ => Err(BrowserError::SessionNotStarted),
        }
    }

    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    /// Store holding the current element map
    pub fn element_map(&self) -> &ElementMapStore {
        &self.elements
    }

    pub fn renderer(&self) -> &AnnotationRenderer {
        &self.renderer
    }

    fn page(&mut self) -> Result<Arc<dyn Page>> {
        self.ensure_started()?;
        self.active_page()
    }

    /// Take an annotated screenshot and publish a fresh element map
    pub fn capture_annotated(&mut self) -> Result<AnnotatedCapture> {
        let page = self.page()?;
        som::capture_annotated(page.as_ref(), self.options.viewport, &self.renderer, &self.elements)
    }

    /// Look up an element in the current map
    pub fn resolve(&self, id: ElementId) -> Result<InteractiveElement> {
        self.elements.resolve(id)
    }

    /// Look up an element, failing unless capture `generation` is still current
    pub fn resolve_in(&self, id: ElementId, generation: Option<u64>) -> Result<InteractiveElement> {
        self.elements.resolve_in(id, generation)
    }

    /// Snapshot of the current map
    pub fn current_map(&self) -> Arc<ElementMap> {
        self.elements.current()
    }

    /// Resolve `id` and perform `action` on it.
    ///
    /// Pass the `generation` of the capture the id was read from to refuse
    /// ids whose capture has since been replaced.
    pub fn act(&mut self, id: ElementId, generation: Option<u64>, action: &ElementAction) -> Result<ActionResult> {
        let page = self.page()?;
        som::resolve_and_act(page.as_ref(), &self.elements, id, generation, action)
    }

    /// Navigate the active page, completing partial URLs first
    pub fn navigate(&mut self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(BrowserError::InvalidArgument("URL must not be empty".to_string()));
        }

        let page = self.page()?;
        let url = complete_url(url);
        log::info!("Navigating to {}", url);
        page.navigate(&url)?;
        Ok(url)
    }

    pub fn go_back(&mut self) -> Result<()> {
        self.history("go_back", "window.history.back()")
    }

    pub fn go_forward(&mut self) -> Result<()> {
        self.history("go_forward", "window.history.forward()")
    }

    pub fn reload(&mut self) -> Result<()> {
        self.history("reload", "window.location.reload()")
    }

    fn history(&mut self, action: &str, call: &str) -> Result<()> {
        let page = self.page()?;
        log::debug!("{}", action);
        page.evaluate(&format!("(function() {{ {}; return true; }})()", call))?;
        std::thread::sleep(HISTORY_SETTLE);
        Ok(())
    }

    /// Scroll the window by `amount` CSS pixels
    pub fn scroll(&mut self, direction: ScrollDirection, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(BrowserError::InvalidArgument(format!(
                "Scroll amount must be a non-negative number, got {}",
                amount
            )));
        }

        let page = self.page()?;
        let (dx, dy) = direction.offset(amount);
        page.scroll_by(dx, dy)
    }

    /// Press a named key on the focused element
    pub fn press_key(&mut self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(BrowserError::InvalidArgument("Key must not be empty".to_string()));
        }
        self.page()?.press_key(key)
    }

    /// Page content converted to Markdown
    pub fn page_text(&mut self) -> Result<String> {
        let page = self.page()?;
        let html = page.evaluate("document.documentElement.outerHTML")?;
        let html = html
            .as_str()
            .ok_or_else(|| BrowserError::EvaluationFailed("Page HTML is not a string".to_string()))?;
        Ok(html2md::parse_html(html))
    }

    pub fn title(&mut self) -> Result<String> {
        self.page()?.title()
    }

    pub fn url(&mut self) -> Result<String> {
        Ok(self.page()?.url())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::som::LabelFont;
    use crate::testing::{FakeBackend, FakePage, RecordedAction};
    use crate::browser::Viewport;
    use serde_json::json;

    fn options() -> LaunchOptions {
        LaunchOptions {
            user_data_dir: None,
            ..LaunchOptions::default()
        }
        .viewport(400, 300)
    }

    fn session_with(backend: FakeBackend) -> (BrowserSession, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let session = BrowserSession::with_backend(options(), backend.clone())
            .with_renderer(AnnotationRenderer::with_font(LabelFont::builtin()));
        (session, backend)
    }

    fn fake_page() -> Arc<FakePage> {
        Arc::new(FakePage::new(Viewport::new(400, 300)).with_elements(json!([
            { "x": 10.0, "y": 10.0, "width": 80.0, "height": 30.0, "tag": "button", "text": "Save" },
        ])))
    }

    #[test]
    fn test_new_session_is_stopped() {
        let (session, backend) = session_with(FakeBackend::new(fake_page()));

        assert_eq!(session.state(), SessionState::Stopped);
        assert!(matches!(session.active_page(), Err(BrowserError::SessionNotStarted)));
        assert_eq!(backend.launch_count(), 0);
    }

    #[test]
    fn test_start_twice_launches_once() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        session.start().unwrap();
        session.start().unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(backend.launch_count(), 1);
    }

    #[test]
    fn test_failed_launch_leaves_session_stopped() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()).failing_launch());

        let err = session.start().unwrap_err();

        assert!(matches!(err, BrowserError::SessionStartFailed(_)));
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.active_page().is_err());
        assert_eq!(backend.close_count(), 0);
    }

    #[test]
    fn test_failed_page_creation_closes_context() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()).failing_new_page());

        assert!(matches!(session.start(), Err(BrowserError::SessionStartFailed(_))));
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn test_new_page_when_context_is_empty() {
        let (mut session, _backend) = session_with(FakeBackend::new(fake_page()).without_initial_page());

        session.start().unwrap();
        assert!(session.active_page().is_ok());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        session.stop();
        session.start().unwrap();
        session.stop();
        session.stop();

        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn test_teardown_errors_are_swallowed() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()).failing_close());

        session.start().unwrap();
        session.stop();

        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        session.start().unwrap();
        session.restart().unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(backend.launch_count(), 2);
        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn test_operations_start_lazily() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        let capture = session.capture_annotated().unwrap();

        assert_eq!(backend.launch_count(), 1);
        assert_eq!(capture.map.len(), 1);
        assert_eq!(session.resolve(1).unwrap().label, "Save");
    }

    #[test]
    fn test_stop_invalidates_ids() {
        let (mut session, _backend) = session_with(FakeBackend::new(fake_page()));

        session.capture_annotated().unwrap();
        session.stop();

        assert!(matches!(session.resolve(1), Err(BrowserError::ElementNotFound(1))));
    }

    #[test]
    fn test_navigate_normalizes_url() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        let url = session.navigate("example.com").unwrap();

        assert_eq!(url, "https://example.com");
        assert_eq!(backend.page().url(), "https://example.com");
    }

    #[test]
    fn test_empty_url_rejected_before_launch() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        assert!(matches!(session.navigate("   "), Err(BrowserError::InvalidArgument(_))));
        assert_eq!(backend.launch_count(), 0);
    }

    #[test]
    fn test_scroll_directions() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        session.scroll(ScrollDirection::Down, 500.0).unwrap();
        session.scroll(ScrollDirection::Left, 40.0).unwrap();

        let scripts: Vec<_> = backend
            .page()
            .actions()
            .into_iter()
            .filter_map(|a| match a {
                RecordedAction::Script(s) => Some(s),
                _ => None,
            })
            .collect();
        assert!(scripts[0].contains("window.scrollBy(0, 500)"));
        assert!(scripts[1].contains("window.scrollBy(-40, 0)"));
    }

    #[test]
    fn test_negative_scroll_rejected() {
        let (mut session, backend) = session_with(FakeBackend::new(fake_page()));

        assert!(matches!(
            session.scroll(ScrollDirection::Up, -1.0),
            Err(BrowserError::InvalidArgument(_))
        ));
        assert_eq!(backend.launch_count(), 0);
    }

    #[test]
    fn test_page_text_converts_html() {
        let page = Arc::new(
            FakePage::new(Viewport::new(400, 300))
                .with_script_result(json!("<html><body><h1>Title</h1><p>Body text</p></body></html>")),
        );
        let (mut session, _backend) = session_with(FakeBackend::new(page));

        let text = session.page_text().unwrap();

        assert!(text.contains("Title"));
        assert!(text.contains("Body text"));
    }

    #[test]
    fn test_drop_closes_browser() {
        let backend = Arc::new(FakeBackend::new(fake_page()));
        {
            let mut session = BrowserSession::with_backend(options(), backend.clone());
            session.start().unwrap();
        }
        assert_eq!(backend.close_count(), 1);
    }
}
