use crate::dom::ElementId;
use crate::error::Result;
use crate::som::ElementAction;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TypeTextParams {
    /// Element id from the latest annotated screenshot
    pub id: ElementId,

    /// `generation` of the capture the id was read from; a newer capture makes the id fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,

    /// Text to type into the element
    pub text: String,

    /// Clear existing content first (default: false)
    #[serde(default)]
    pub clear: bool,

    /// Press Enter afterwards (default: false)
    #[serde(default)]
    pub submit: bool,
}

/// Clicks an element to focus it, then types
#[derive(Default)]
pub struct TypeTextTool;

impl Tool for TypeTextTool {
    type Params = TypeTextParams;

    fn name(&self) -> &str {
        "type_text"
    }

    fn execute_typed(&self, params: TypeTextParams, context: &mut ToolContext) -> Result<ToolResult> {
        let text_length = params.text.chars().count();
        let mut result = context.act(
            params.id,
            params.generation,
            ElementAction::Type {
                text: params.text,
                clear: params.clear,
                submit: params.submit,
            },
        )?;

        if let Some(data) = result.data.as_mut() {
            data["text_length"] = text_length.into();
        }
        Ok(result)
    }
}
