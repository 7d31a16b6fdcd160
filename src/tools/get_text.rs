use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetTextParams {
    /// Truncate the Markdown to this many characters
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Page content as Markdown
#[derive(Default)]
pub struct GetTextTool;

impl Tool for GetTextTool {
    type Params = GetTextParams;

    fn name(&self) -> &str {
        "get_text"
    }

    fn execute_typed(&self, params: GetTextParams, context: &mut ToolContext) -> Result<ToolResult> {
        let markdown = context.session.page_text()?;
        let title = context.page_title();
        let url = context.session.url()?;

        let total = markdown.chars().count();
        let (markdown, truncated) = match params.max_length {
            Some(limit) if total > limit => (markdown.chars().take(limit).collect::<String>(), true),
            _ => (markdown, false),
        };

        Ok(ToolResult::success_with(serde_json::json!({
            "markdown": markdown,
            "title": title,
            "url": url,
            "length": total,
            "truncated": truncated,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserSession, LaunchOptions, Viewport};
    use crate::testing::{FakeBackend, FakePage};
    use std::sync::Arc;

    fn session(html: &str) -> BrowserSession {
        let page = FakePage::new(Viewport::new(400, 300)).with_script_result(serde_json::json!(html));
        let options = LaunchOptions { user_data_dir: None, ..LaunchOptions::default() };
        BrowserSession::with_backend(options, Arc::new(FakeBackend::new(Arc::new(page))))
    }

    #[test]
    fn test_get_text_tool_name() {
        assert_eq!(GetTextTool.name(), "get_text");
    }

    #[test]
    fn test_get_text_markdown() {
        let mut session = session("<html><body><h2>News</h2><p>Rust 2024 edition</p></body></html>");
        let mut context = ToolContext::new(&mut session);

        let result = GetTextTool.execute_typed(GetTextParams::default(), &mut context).unwrap();
        let data = result.data.unwrap();

        assert!(data["markdown"].as_str().unwrap().contains("Rust 2024 edition"));
        assert_eq!(data["truncated"], false);
        assert!(result.screenshot.is_none());
    }

    #[test]
    fn test_get_text_truncates() {
        let mut session = session("<p>abcdefghijklmnopqrstuvwxyz</p>");
        let mut context = ToolContext::new(&mut session);

        let result = GetTextTool
            .execute_typed(GetTextParams { max_length: Some(5) }, &mut context)
            .unwrap();
        let data = result.data.unwrap();

        assert_eq!(data["markdown"].as_str().unwrap().chars().count(), 5);
        assert_eq!(data["truncated"], true);
    }
}
