use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RestartParams {}

/// Tears the browser down and launches it again with the same profile
#[derive(Default)]
pub struct RestartTool;

impl Tool for RestartTool {
    type Params = RestartParams;

    fn name(&self) -> &str {
        "restart"
    }

    fn execute_typed(&self, _params: RestartParams, context: &mut ToolContext) -> Result<ToolResult> {
        context.session.restart()?;
        context.capture(serde_json::json!({ "restarted": true }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SessionState;
    use crate::tools::test_support;

    #[test]
    fn test_restart_recaptures() {
        let (mut session, _page) = test_support::session();
        session.capture_annotated().unwrap();
        let mut context = ToolContext::new(&mut session);

        let data = RestartTool.execute_typed(RestartParams {}, &mut context).unwrap().data.unwrap();

        assert_eq!(data["restarted"], true);
        // stop() published an empty map, the new capture comes after it
        assert_eq!(data["generation"], 3);
        assert_eq!(context.session.state(), SessionState::Running);
    }
}
