//! MCP (Model Context Protocol) server for Set-of-Marks browser control
//!
//! Every `browser_*` tool runs the matching [`crate::tools`] tool against
//! the shared session. Tools that take a capture answer with the element
//! listing as text plus the annotated PNG as image content.

pub mod handler;
pub use handler::BrowserServer;

use crate::error::BrowserError;
use crate::tools::click::ClickParams;
use crate::tools::get_text::GetTextParams;
use crate::tools::hover::HoverParams;
use crate::tools::navigate::NavigateParams;
use crate::tools::press_key::PressKeyParams;
use crate::tools::scroll::ScrollParams;
use crate::tools::select_option::SelectOptionParams;
use crate::tools::type_text::TypeTextParams;
use crate::tools::{ToolContext, ToolResult as InternalToolResult};
use base64::Engine as _;
use base64::engine::general_purpose;
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use serde::Serialize;
use serde_json::{Value, json};

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> CallToolResult {
    let text = match result.data {
        Some(data) => serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()),
        None => "Success".to_string(),
    };

    let mut contents = vec![Content::text(text)];
    if let Some(png) = result.screenshot {
        contents.push(Content::image(general_purpose::STANDARD.encode(&png), "image/png".to_string()));
    }

    CallToolResult::success(contents)
}

fn convert_error(err: BrowserError) -> McpError {
    match err {
        BrowserError::InvalidArgument(_) | BrowserError::ElementNotFound(_) => {
            McpError::invalid_params(err.to_string(), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn to_params<P: Serialize>(params: P) -> Result<Value, McpError> {
    serde_json::to_value(params).map_err(|e| McpError::invalid_params(e.to_string(), None))
}

impl BrowserServer {
    fn run(&self, tool: &str, params: Value) -> Result<CallToolResult, McpError> {
        let mut session = self.session();
        let mut context = ToolContext::new(&mut session);

        let result = self
            .registry()
            .execute(tool, params, &mut context)
            .map_err(convert_error)?;

        Ok(convert_result(result))
    }
}

#[tool_router]
impl BrowserServer {
    #[tool(description = "Navigate to a URL. Returns an annotated screenshot of the loaded page.")]
    fn browser_navigate(&self, params: Parameters<NavigateParams>) -> Result<CallToolResult, McpError> {
        self.run("navigate", to_params(params.0)?)
    }

    #[tool(
        description = "Take a screenshot with numbered red boxes on every visible interactive element. Use the numbers as ids for the other tools."
    )]
    fn browser_screenshot(&self) -> Result<CallToolResult, McpError> {
        self.run("screenshot", json!({}))
    }

    #[tool(description = "Click the element with the given id from the latest screenshot")]
    fn browser_click(&self, params: Parameters<ClickParams>) -> Result<CallToolResult, McpError> {
        self.run("click", to_params(params.0)?)
    }

    #[tool(description = "Click the element with the given id and type text into it, optionally clearing it first and pressing Enter afterwards")]
    fn browser_type_text(&self, params: Parameters<TypeTextParams>) -> Result<CallToolResult, McpError> {
        self.run("type_text", to_params(params.0)?)
    }

    #[tool(description = "Move the mouse over the element with the given id")]
    fn browser_hover(&self, params: Parameters<HoverParams>) -> Result<CallToolResult, McpError> {
        self.run("hover", to_params(params.0)?)
    }

    #[tool(description = "Choose an option of the <select> element with the given id")]
    fn browser_select_option(&self, params: Parameters<SelectOptionParams>) -> Result<CallToolResult, McpError> {
        self.run("select_option", to_params(params.0)?)
    }

    #[tool(description = "Press a key such as Enter, Escape, Tab or ArrowDown")]
    fn browser_press_key(&self, params: Parameters<PressKeyParams>) -> Result<CallToolResult, McpError> {
        self.run("press_key", to_params(params.0)?)
    }

    #[tool(description = "Scroll the page up, down, left or right by a number of pixels")]
    fn browser_scroll(&self, params: Parameters<ScrollParams>) -> Result<CallToolResult, McpError> {
        self.run("scroll", to_params(params.0)?)
    }

    #[tool(description = "Go back in browser history")]
    fn browser_go_back(&self) -> Result<CallToolResult, McpError> {
        self.run("go_back", json!({}))
    }

    #[tool(description = "Go forward in browser history")]
    fn browser_go_forward(&self) -> Result<CallToolResult, McpError> {
        self.run("go_forward", json!({}))
    }

    #[tool(description = "Reload the current page")]
    fn browser_reload(&self) -> Result<CallToolResult, McpError> {
        self.run("reload", json!({}))
    }

    #[tool(description = "Get the page content as Markdown")]
    fn browser_get_text(&self, params: Parameters<GetTextParams>) -> Result<CallToolResult, McpError> {
        self.run("get_text", to_params(params.0)?)
    }

    #[tool(description = "List the elements of the latest screenshot without taking a new one")]
    fn browser_list_elements(&self) -> Result<CallToolResult, McpError> {
        self.run("list_elements", json!({}))
    }

    #[tool(description = "Restart the browser. Cookies and logins survive in the profile directory.")]
    fn browser_restart(&self) -> Result<CallToolResult, McpError> {
        self.run("restart", json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserSession, LaunchOptions, Viewport};
    use crate::som::{AnnotationRenderer, LabelFont};
    use crate::testing::{FakeBackend, FakePage};
    use rmcp::ServerHandler;
    use rmcp::model::RawContent;
    use std::sync::Arc;

    fn server() -> BrowserServer {
        let page = Arc::new(FakePage::new(Viewport::new(320, 200)).with_elements(json!([
            { "x": 20.0, "y": 40.0, "width": 90.0, "height": 24.0, "tag": "a", "text": "Docs", "href": "/docs" },
        ])));
        let options = LaunchOptions { user_data_dir: None, ..LaunchOptions::default() }.viewport(320, 200);
        let session = BrowserSession::with_backend(options, Arc::new(FakeBackend::new(page)))
            .with_renderer(AnnotationRenderer::with_font(LabelFont::builtin()));
        BrowserServer::with_session(session)
    }

    #[test]
    fn test_router_lists_browser_tools() {
        let names: Vec<String> = server()
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        assert_eq!(names.len(), 14);
        for name in ["browser_screenshot", "browser_click", "browser_type_text", "browser_restart"] {
            assert!(names.iter().any(|n| n == name), "missing {}", name);
        }
    }

    #[test]
    fn test_screenshot_returns_text_and_image() {
        let result = server().browser_screenshot().unwrap();

        assert_eq!(result.content.len(), 2);
        match &result.content[0].raw {
            RawContent::Text(text) => assert!(text.text.contains("[1] a \\\"Docs\\\" -> /docs")),
            other => panic!("Expected text, got {:?}", other),
        }
        match &result.content[1].raw {
            RawContent::Image(image) => {
                assert_eq!(image.mime_type, "image/png");
                let png = general_purpose::STANDARD.decode(&image.data).unwrap();
                assert!(png.starts_with(b"\x89PNG"));
            }
            other => panic!("Expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_id_is_invalid_params() {
        let server = server();
        server.browser_screenshot().unwrap();

        let err = server.browser_click(Parameters(ClickParams { id: 42, generation: None })).unwrap_err();
        assert!(err.message.contains("Element 42"));
    }

    #[test]
    fn test_replaced_generation_is_invalid_params() {
        let server = server();
        server.browser_screenshot().unwrap();
        let stale = server.session().current_map().generation();
        server.browser_screenshot().unwrap();

        let err = server
            .browser_click(Parameters(ClickParams { id: 1, generation: Some(stale) }))
            .unwrap_err();
        assert!(err.message.contains("Element 1"));
    }

    #[test]
    fn test_clones_share_session() {
        let server = server();
        let clone = server.clone();
        server.browser_screenshot().unwrap();

        assert!(clone.session().resolve(1).is_ok());
    }

    #[test]
    fn test_server_info_mentions_ids() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("id"));
    }
}
