use crate::dom::ElementId;
use thiserror::Error;

/// Errors produced by the browser session, the Set-of-Marks pipeline and the tool layer
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No page is active; the session has not been started (or was stopped)
    #[error("Browser session not started. Call start() first.")]
    SessionNotStarted,

    /// Launching the browser failed; the session was cleaned up before this was returned
    #[error("Failed to start browser session: {0}")]
    SessionStartFailed(String),

    /// The id is not part of the current element map
    #[error("Element {0} not found in the current element map. Take a new screenshot to refresh element ids.")]
    ElementNotFound(ElementId),

    /// The screenshot could not be decoded or the annotated image could not be encoded
    #[error("Failed to render annotated screenshot: {0}")]
    RenderFailed(String),

    /// Input dispatch exceeded the engine timeout
    #[error("Action '{action}' timed out: {reason}")]
    ActionTimeout { action: String, reason: String },

    #[error("Action '{action}' failed: {reason}")]
    ActionFailed { action: String, reason: String },

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    #[error("Failed to parse page scan: {0}")]
    DomParseFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// Map a browser-engine error raised while performing `action`.
    ///
    /// Errors whose chain mentions a timeout become [`BrowserError::ActionTimeout`],
    /// everything else becomes [`BrowserError::ActionFailed`].
    pub fn from_action(action: &str, err: &anyhow::Error) -> Self {
        let timed_out = err.chain().any(|cause| {
            let message = cause.to_string().to_lowercase();
            message.contains("timeout") || message.contains("timed out")
        });

        if timed_out {
            BrowserError::ActionTimeout {
                action: action.to_string(),
                reason: err.to_string(),
            }
        } else {
            BrowserError::ActionFailed {
                action: action.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Whether this error came from an engine timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::ActionTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, BrowserError>;
