use crate::dom::ElementId;
use crate::error::Result;
use crate::som::ElementAction;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectOptionParams {
    /// Id of a `<select>` element from the latest annotated screenshot
    pub id: ElementId,

    /// `generation` of the capture the id was read from; a newer capture makes the id fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,

    /// Option value or visible option text
    pub value: String,
}

#[derive(Default)]
pub struct SelectOptionTool;

impl Tool for SelectOptionTool {
    type Params = SelectOptionParams;

    fn name(&self) -> &str {
        "select_option"
    }

    fn execute_typed(&self, params: SelectOptionParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.act(params.id, params.generation, ElementAction::Select { value: params.value })
    }
}
