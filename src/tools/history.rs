//! Back, forward and reload

use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// No parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistoryParams {}

#[derive(Default)]
pub struct GoBackTool;

impl Tool for GoBackTool {
    type Params = HistoryParams;

    fn name(&self) -> &str {
        "go_back"
    }

    fn execute_typed(&self, _params: HistoryParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.go_back()?;
        after_history(context)
    }
}

#[derive(Default)]
pub struct GoForwardTool;

impl Tool for GoForwardTool {
    type Params = HistoryParams;

    fn name(&self) -> &str {
        "go_forward"
    }

    fn execute_typed(&self, _params: HistoryParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.go_forward()?;
        after_history(context)
    }
}

#[derive(Default)]
pub struct ReloadTool;

impl Tool for ReloadTool {
    type Params = HistoryParams;

    fn name(&self) -> &str {
        "reload"
    }

    fn execute_typed(&self, _params: HistoryParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.reload()?;
        after_history(context)
    }
}

fn after_history(context: &mut ToolContext) -> Result<ToolResult> {
    let url = context.session.url()?;
    context.settle_and_capture(serde_json::json!({ "url": url }))
}
