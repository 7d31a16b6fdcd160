use crate::dom::ElementId;
use crate::error::Result;
use crate::som::ElementAction;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HoverParams {
    /// Element id from the latest annotated screenshot
    pub id: ElementId,

    /// `generation` of the capture the id was read from; a newer capture makes the id fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}

/// Moves the mouse over an element, e.g. to open a menu
#[derive(Default)]
pub struct HoverTool;

impl Tool for HoverTool {
    type Params = HoverParams;

    fn name(&self) -> &str {
        "hover"
    }

    fn execute_typed(&self, params: HoverParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.act(params.id, params.generation, ElementAction::Hover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Point;
    use crate::testing::RecordedAction;
    use crate::tools::test_support;
    use std::time::Duration;

    #[test]
    fn test_hover_moves_to_center() {
        let (mut session, page) = test_support::session();
        session.capture_annotated().unwrap();
        let mut context = ToolContext::new(&mut session).with_settle_delay(Duration::ZERO);

        let result = HoverTool.execute_typed(HoverParams { id: 1, generation: None }, &mut context).unwrap();

        assert!(result.screenshot.is_some());
        assert_eq!(page.actions(), vec![RecordedAction::Hover(Point { x: 60.0, y: 20.0 })]);
    }
}
