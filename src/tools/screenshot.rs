use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// No parameters; the capture always covers the viewport
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScreenshotParams {}

/// Annotated screenshot of the viewport plus the element listing
#[derive(Default)]
pub struct ScreenshotTool;

impl Tool for ScreenshotTool {
    type Params = ScreenshotParams;

    fn name(&self) -> &str {
        "screenshot"
    }

    fn execute_typed(&self, _params: ScreenshotParams, context: &mut ToolContext) -> Result<ToolResult> {
        let url = context.session.url()?;
        let title = context.page_title();
        context.capture(serde_json::json!({ "url": url, "title": title }))
    }
}
