use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL to navigate to; a missing scheme is filled in
    pub url: String,
}

/// Tool for navigating to a URL
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let normalized_url = context.session.navigate(&params.url)?;
        let title = context.page_title();

        context.settle_and_capture(serde_json::json!({
            "original_url": params.url,
            "normalized_url": normalized_url,
            "title": title,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordedAction;
    use crate::tools::test_support;
    use std::time::Duration;

    #[test]
    fn test_navigate_params() {
        let json = serde_json::json!({
            "url": "https://example.com"
        });

        let params: NavigateParams = serde_json::from_value(json).unwrap();
        assert_eq!(params.url, "https://example.com");
    }

    #[test]
    fn test_navigate_tool_metadata() {
        let tool = NavigateTool;
        assert_eq!(tool.name(), "navigate");
        let schema = tool.parameters_schema();
        assert!(schema.is_object());
    }

    #[test]
    fn test_navigate_normalizes_and_captures() {
        let (mut session, page) = test_support::session();
        page.set_title("Example Domain");
        let mut context = ToolContext::new(&mut session).with_settle_delay(Duration::ZERO);

        let result = NavigateTool
            .execute_typed(NavigateParams { url: "example.com".to_string() }, &mut context)
            .unwrap();
        let data = result.data.unwrap();

        assert_eq!(data["normalized_url"], "https://example.com");
        assert_eq!(data["title"], "Example Domain");
        assert_eq!(data["element_count"], 3);
        assert_eq!(page.actions(), vec![RecordedAction::Navigate("https://example.com".to_string())]);
    }
}
