use crate::browser::{BrowserSession, LaunchOptions};
use crate::tools::ToolRegistry;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool_handler};
use std::sync::{Arc, Mutex, MutexGuard};

const INSTRUCTIONS: &str = "Browser control with Set-of-Marks screenshots. \
Call browser_screenshot to see the page: every interactive element is outlined in red and tagged with a number. \
Use that number as `id` for browser_click, browser_type_text, browser_hover and browser_select_option. \
Ids are only valid for the most recent screenshot; actions that change the page return a new screenshot with new ids. \
Every screenshot reports a `generation`; pass it along with the id and the action is refused if a newer screenshot replaced it.";

/// MCP server exposing the browser session as tools.
///
/// Clones share one session, so every connection of the process drives the
/// same browser.
#[derive(Clone)]
pub struct BrowserServer {
    session: Arc<Mutex<BrowserSession>>,
    registry: Arc<ToolRegistry>,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl BrowserServer {
    /// Server with a default session that launches Chrome on first use
    pub fn new() -> Self {
        Self::with_options(LaunchOptions::default())
    }

    /// Server with a session built from `options`. The browser is not launched yet.
    pub fn with_options(options: LaunchOptions) -> Self {
        Self::with_session(BrowserSession::new(options))
    }

    pub fn with_session(session: BrowserSession) -> Self {
        Self::from_shared(Arc::new(Mutex::new(session)))
    }

    /// Server driving an already shared session
    pub fn from_shared(session: Arc<Mutex<BrowserSession>>) -> Self {
        Self {
            session,
            registry: Arc::new(ToolRegistry::with_defaults()),
            tool_router: Self::tool_router(),
        }
    }

    /// Lock the session
    pub fn session(&self) -> MutexGuard<'_, BrowserSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Handle to the shared session
    pub fn shared_session(&self) -> Arc<Mutex<BrowserSession>> {
        self.session.clone()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl Default for BrowserServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for BrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}
