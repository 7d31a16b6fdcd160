use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListElementsParams {}

/// Lists the current element map without taking a new capture
#[derive(Default)]
pub struct ListElementsTool;

impl Tool for ListElementsTool {
    type Params = ListElementsParams;

    fn name(&self) -> &str {
        "list_elements"
    }

    fn execute_typed(&self, _params: ListElementsParams, context: &mut ToolContext) -> Result<ToolResult> {
        let map = context.session.current_map();
        let elements: Vec<_> = map.iter().collect();

        Ok(ToolResult::success_with(serde_json::json!({
            "generation": map.generation(),
            "element_count": map.len(),
            "elements": map.describe(),
            "items": elements,
        })))
    }
}
