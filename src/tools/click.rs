use crate::dom::ElementId;
use crate::error::Result;
use crate::som::ElementAction;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the click tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClickParams {
    /// Element id from the latest annotated screenshot
    pub id: ElementId,

    /// `generation` of the capture the id was read from; a newer capture makes the id fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}

/// Tool for clicking an element by its mark
#[derive(Default)]
pub struct ClickTool;

impl Tool for ClickTool {
    type Params = ClickParams;

    fn name(&self) -> &str {
        "click"
    }

    fn execute_typed(&self, params: ClickParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.act(params.id, params.generation, ElementAction::Click)
    }
}
