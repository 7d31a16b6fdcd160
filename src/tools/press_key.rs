use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PressKeyParams {
    /// Key name, e.g. "Enter", "Escape", "Tab", "ArrowDown"
    pub key: String,
}

/// Presses a key on whatever currently has focus
#[derive(Default)]
pub struct PressKeyTool;

impl Tool for PressKeyTool {
    type Params = PressKeyParams;

    fn name(&self) -> &str {
        "press_key"
    }

    fn execute_typed(&self, params: PressKeyParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.press_key(&params.key)?;
        context.settle_and_capture(serde_json::json!({ "key": params.key }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowserError;
    use crate::testing::RecordedAction;
    use crate::tools::test_support;
    use std::time::Duration;

    #[test]
    fn test_press_key() {
        let (mut session, page) = test_support::session();
        let mut context = ToolContext::new(&mut session).with_settle_delay(Duration::ZERO);

        let result = PressKeyTool
            .execute_typed(PressKeyParams { key: "Escape".to_string() }, &mut context)
            .unwrap();

        assert_eq!(result.data.unwrap()["key"], "Escape");
        assert_eq!(page.actions(), vec![RecordedAction::Key("Escape".to_string())]);
    }

    #[test]
    fn test_blank_key_rejected() {
        let (mut session, _page) = test_support::session();
        let mut context = ToolContext::new(&mut session);

        let err = PressKeyTool
            .execute_typed(PressKeyParams { key: " ".to_string() }, &mut context)
            .unwrap_err();
        assert!(matches!(err, BrowserError::InvalidArgument(_)));
    }
}
