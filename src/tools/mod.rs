//! Browser automation tools
//!
//! Each tool is a typed operation on the [`BrowserSession`] with
//! JSON-schema-described parameters. The [`ToolRegistry`] dispatches by name
//! so the same tools back the MCP server and the CLI.
//!
//! Tools that change the page answer with a fresh annotated capture, so the
//! caller always holds ids from the newest element map.

pub mod click;
pub mod get_text;
pub mod history;
pub mod hover;
pub mod list_elements;
pub mod navigate;
pub mod press_key;
pub mod restart;
pub mod screenshot;
pub mod scroll;
pub mod select_option;
pub mod type_text;

use crate::browser::BrowserSession;
use crate::dom::ElementId;
use crate::error::{BrowserError, Result};
use crate::som::ElementAction;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Pause between a state-changing action and the capture that follows it
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// A browser tool with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    /// Registry name
    fn name(&self) -> &str;

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// JSON schema of [`Tool::Params`]
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    /// Parse raw JSON parameters, then run the tool
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params: Self::Params = serde_json::from_value(params).map_err(|e| {
            BrowserError::InvalidArgument(format!("Invalid parameters for '{}': {}", Tool::name(self), e))
        })?;
        self.execute_typed(params, context)
    }
}

/// Object-safe view of a [`Tool`]
trait DynTool: Send + Sync {
    fn parameters_schema(&self) -> Value;
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        Tool::execute(self, params, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(navigate::NavigateTool);
        registry.register(screenshot::ScreenshotTool);
        registry.register(click::ClickTool);
        registry.register(type_text::TypeTextTool);
        registry.register(hover::HoverTool);
        registry.register(select_option::SelectOptionTool);
        registry.register(press_key::PressKeyTool);
        registry.register(scroll::ScrollTool);
        registry.register(history::GoBackTool);
        registry.register(history::GoForwardTool);
        registry.register(history::ReloadTool);
        registry.register(get_text::GetTextTool);
        registry.register(list_elements::ListElementsTool);
        registry.register(restart::RestartTool);

        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn parameters_schema(&self, name: &str) -> Option<Value> {
        self.tools.get(name).map(|tool| tool.parameters_schema())
    }

    /// Run a tool by name
    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| BrowserError::UnknownTool(name.to_string()))?;

        log::debug!("Executing tool {}", name);
        tool.execute(params, context)
    }
}

/// What a tool gets to work with
pub struct ToolContext<'a> {
    pub session: &'a mut BrowserSession,
    settle_delay: Duration,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a mut BrowserSession) -> Self {
        Self { session, settle_delay: DEFAULT_SETTLE_DELAY }
    }

    /// Builder method: set the pause before follow-up captures
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Capture the page and fold the element listing into `data`
    pub fn capture(&mut self, mut data: Value) -> Result<ToolResult> {
        let capture = self.session.capture_annotated()?;

        if let Value::Object(fields) = &mut data {
            fields.insert("element_count".to_string(), capture.map.len().into());
            fields.insert("generation".to_string(), capture.map.generation().into());
            fields.insert("elements".to_string(), Value::String(capture.map.describe()));
        }

        Ok(ToolResult::success_with(data).with_screenshot(capture.image))
    }

    /// Resolve `id`, act on it, then capture the resulting page
    pub fn act(&mut self, id: ElementId, generation: Option<u64>, action: ElementAction) -> Result<ToolResult> {
        let result = self.session.act(id, generation, &action)?;

        self.settle_and_capture(serde_json::json!({
            "action": result.action,
            "id": result.id,
            "element": result.element.to_simple_string(),
        }))
    }

    /// Document title for tool output; a failed read is logged and reported as empty
    pub fn page_title(&mut self) -> String {
        match self.session.title() {
            Ok(title) => title,
            Err(e) => {
                log::debug!("Could not read page title: {}", e);
                String::new()
            }
        }
    }

    /// Wait for the page to settle, then [`ToolContext::capture`]
    pub fn settle_and_capture(&mut self, data: Value) -> Result<ToolResult> {
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        self.capture(data)
    }
}

/// Outcome of a successful tool call; failures are returned as [`BrowserError`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Annotated PNG, when the tool took a capture
    #[serde(skip)]
    pub screenshot: Option<Vec<u8>>,
}

impl ToolResult {
    pub fn success(data: Option<Value>) -> Self {
        Self { data, screenshot: None }
    }

    pub fn success_with(data: Value) -> Self {
        Self::success(Some(data))
    }

    /// Builder method: attach an annotated screenshot
    pub fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = Some(png);
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::browser::{BrowserSession, LaunchOptions, Viewport};
    use crate::som::{AnnotationRenderer, LabelFont};
    use crate::testing::{FakeBackend, FakePage};
    use serde_json::json;
    use std::sync::Arc;

    /// Session over a fake page showing a search form
    pub fn session() -> (BrowserSession, Arc<FakePage>) {
        let page = Arc::new(FakePage::new(Viewport::new(400, 300)).with_elements(json!([
            { "x": 10.0, "y": 10.0, "width": 100.0, "height": 20.0, "tag": "input", "type": "text", "placeholder": "Search" },
            { "x": 120.0, "y": 10.0, "width": 60.0, "height": 20.0, "tag": "button", "text": "Go" },
            { "x": 10.0, "y": 50.0, "width": 100.0, "height": 20.0, "tag": "select", "ariaLabel": "Country" },
        ])));
        let options = LaunchOptions { user_data_dir: None, ..LaunchOptions::default() }.viewport(400, 300);
        let session = BrowserSession::with_backend(options, Arc::new(FakeBackend::new(page.clone())))
            .with_renderer(AnnotationRenderer::with_font(LabelFont::builtin()));
        (session, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{LaunchOptions, Viewport};
    use crate::som::{AnnotationRenderer, LabelFont};
    use crate::testing::{FakeBackend, FakePage};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_default_registry_names() {
        let registry = ToolRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();

        assert_eq!(
            names,
            vec![
                "navigate",
                "screenshot",
                "click",
                "type_text",
                "hover",
                "select_option",
                "press_key",
                "scroll",
                "go_back",
                "go_forward",
                "reload",
                "get_text",
                "list_elements",
                "restart",
            ]
        );
    }

    #[test]
    fn test_every_tool_has_object_schema() {
        let registry = ToolRegistry::with_defaults();
        for name in registry.names() {
            let schema = registry.parameters_schema(name).unwrap();
            assert!(schema.is_object(), "schema of {} is not an object", name);
        }
    }

    #[test]
    fn test_unknown_tool() {
        let (mut session, _page) = test_support::session();
        let mut context = ToolContext::new(&mut session);

        let err = ToolRegistry::with_defaults()
            .execute("evaluate", json!({}), &mut context)
            .unwrap_err();
        assert!(matches!(err, BrowserError::UnknownTool(name) if name == "evaluate"));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let (mut session, _page) = test_support::session();
        let mut context = ToolContext::new(&mut session);

        let err = ToolRegistry::with_defaults()
            .execute("click", json!({ "id": "first" }), &mut context)
            .unwrap_err();
        assert!(matches!(err, BrowserError::InvalidArgument(_)));
    }

    #[test]
    fn test_capture_adds_listing() {
        let (mut session, _page) = test_support::session();
        let mut context = ToolContext::new(&mut session).with_settle_delay(Duration::ZERO);

        let result = context.settle_and_capture(json!({ "action": "noop" })).unwrap();
        let data = result.data.unwrap();

        assert!(result.screenshot.is_some());
        assert_eq!(data["action"], "noop");
        assert_eq!(data["element_count"], 3);
        assert!(data["elements"].as_str().unwrap().contains("[2] button \"Go\""));
    }

    #[test]
    fn test_unreadable_title_does_not_fail_tools() {
        let page = Arc::new(FakePage::new(Viewport::new(200, 100)).with_failing_title());
        let options = LaunchOptions { user_data_dir: None, ..LaunchOptions::default() }.viewport(200, 100);
        let mut session = BrowserSession::with_backend(options, Arc::new(FakeBackend::new(page)))
            .with_renderer(AnnotationRenderer::with_font(LabelFont::builtin()));
        let mut context = ToolContext::new(&mut session).with_settle_delay(Duration::ZERO);

        assert_eq!(context.page_title(), "");
        let result = ToolRegistry::with_defaults()
            .execute("screenshot", json!({}), &mut context)
            .unwrap();
        assert_eq!(result.data.unwrap()["title"], "");
    }

    #[test]
    fn test_tool_result_serialization_skips_image() {
        let result = ToolResult::success_with(json!({ "ok": true })).with_screenshot(vec![1, 2, 3]);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value, json!({ "data": { "ok": true } }));
    }
}
