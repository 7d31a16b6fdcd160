use crate::browser::ScrollDirection;
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScrollParams {
    /// Direction to scroll (default: down)
    #[serde(default = "default_direction")]
    pub direction: ScrollDirection,

    /// Distance in pixels (default: 500)
    #[serde(default = "default_amount")]
    pub amount: f64,
}

fn default_direction() -> ScrollDirection {
    ScrollDirection::Down
}

fn default_amount() -> f64 {
    500.0
}

/// Scrolls the page and returns the newly visible elements
#[derive(Default)]
pub struct ScrollTool;

impl Tool for ScrollTool {
    type Params = ScrollParams;

    fn name(&self) -> &str {
        "scroll"
    }

    fn execute_typed(&self, params: ScrollParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.scroll(params.direction, params.amount)?;
        context.settle_and_capture(serde_json::json!({
            "direction": params.direction,
            "amount": params.amount,
        }))
    }
}
