use crate::browser::Page;
use crate::dom::element_map::lookup;
use crate::dom::{ElementId, ElementMapStore, InteractiveElement};
use crate::error::{BrowserError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Empties the value of whatever the preceding click focused
const CLEAR_FOCUSED_SCRIPT: &str = r#"(function() {
    const el = document.activeElement;
    if (!el) return false;
    if ('value' in el) {
        el.value = '';
        el.dispatchEvent(new Event('input', { bubbles: true }));
        return true;
    }
    if (el.isContentEditable) {
        el.textContent = '';
        return true;
    }
    return false;
})()"#;

/// What to do with a resolved element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ElementAction {
    Click,
    Hover,
    Type {
        text: String,
        /// Empty the field before typing
        #[serde(default)]
        clear: bool,
        /// Press Enter after typing
        #[serde(default)]
        submit: bool,
    },
    Select {
        value: String,
    },
}

impl ElementAction {
    pub fn name(&self) -> &'static str {
        match self {
            ElementAction::Click => "click",
            ElementAction::Hover => "hover",
            ElementAction::Type { .. } => "type_text",
            ElementAction::Select { .. } => "select_option",
        }
    }
}

/// Outcome of acting on an element
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub id: ElementId,
    pub action: String,
    pub element: InteractiveElement,
    /// Generation of the map the id was resolved against
    pub generation: u64,
}

/// Resolve `id` against the current map and perform `action` at its centre.
///
/// Resolution never falls back to another element: an unknown id fails with
/// [`BrowserError::ElementNotFound`] and nothing is dispatched. When
/// `generation` is given, the id must come from that capture and the capture
/// must still be current.
pub fn resolve_and_act(
    page: &dyn Page,
    store: &ElementMapStore,
    id: ElementId,
    generation: Option<u64>,
    action: &ElementAction,
) -> Result<ActionResult> {
    let map = store.current();
    let element = lookup(&map, id, generation)?.clone();
    let center = element.center;

    log::debug!("{} on element {} at ({:.1}, {:.1})", action.name(), id, center.x, center.y);

    match action {
        ElementAction::Click => page.click_at(center)?,
        ElementAction::Hover => page.hover_at(center)?,
        ElementAction::Type { text, clear, submit } => {
            page.click_at(center)?;
            if *clear {
                page.evaluate(CLEAR_FOCUSED_SCRIPT)?;
            }
            page.type_text(text)?;
            if *submit {
                page.press_key("Enter")?;
            }
        }
        ElementAction::Select { value } => {
            let selected = page.evaluate(&select_script(center.x, center.y, value))?;
            if selected.as_bool() != Some(true) {
                return Err(BrowserError::ActionFailed {
                    action: action.name().to_string(),
                    reason: format!("Element {} is not a <select> with option '{}'", id, value),
                });
            }
        }
    }

    Ok(ActionResult {
        id,
        action: action.name().to_string(),
        element,
        generation: map.generation(),
    })
}

fn select_script(x: f64, y: f64, value: &str) -> String {
    // serde_json gives us a correctly escaped JS string literal
    let value = serde_json::Value::String(value.to_string()).to_string();
    format!(
        r#"(function() {{
    let el = document.elementFromPoint({x}, {y});
    while (el && el.tagName !== 'SELECT') el = el.parentElement;
    if (!el) return false;
    const wanted = {value};
    const option = Array.from(el.options).find(o => o.value === wanted || o.text.trim() === wanted);
    if (!option) return false;
    el.value = option.value;
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
}})()"#
    )
}
