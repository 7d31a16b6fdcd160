//! # browser-control
//!
//! Set-of-Marks browser control for AI agents. The crate drives one
//! persistent Chrome session, draws a numbered red box over every visible
//! interactive element of the page and lets an agent act on elements by
//! number instead of by selector or coordinates.
//!
//! ## MCP Server
//!
//! The recommended way to use this library is the Model Context Protocol
//! server, which exposes the browser as `browser_*` tools:
//!
//! ```bash
//! # Run headless browser over stdio
//! cargo run --bin browser-control-mcp --features mcp-server
//!
//! # Run with visible browser (useful for debugging)
//! cargo run --bin browser-control-mcp --features mcp-server -- --headed
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use browser_control::{BrowserSession, ElementAction, LaunchOptions};
//!
//! # fn main() -> browser_control::Result<()> {
//! let mut session = BrowserSession::new(LaunchOptions::default());
//! session.navigate("example.com")?;
//!
//! // Annotated PNG plus the id → element map it shows
//! let capture = session.capture_annotated()?;
//! println!("{}", capture.map.describe());
//!
//! // Ids come from the most recent capture
//! session.act(1, Some(capture.map.generation()), &ElementAction::Click)?;
//! session.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Tool System
//!
//! ```rust,no_run
//! use browser_control::{BrowserSession, LaunchOptions};
//! use browser_control::tools::{ToolContext, ToolRegistry};
//! use serde_json::json;
//!
//! # fn main() -> browser_control::Result<()> {
//! let mut session = BrowserSession::new(LaunchOptions::default());
//! let registry = ToolRegistry::with_defaults();
//! let mut context = ToolContext::new(&mut session);
//!
//! registry.execute("navigate", json!({"url": "https://example.com"}), &mut context)?;
//! registry.execute("click", json!({"id": 1}), &mut context)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Session lifecycle, launch options and the page capability traits
//! - [`dom`]: Element scanning, id assignment and the current element map
//! - [`som`]: Annotated capture, mark rendering and acting on elements by id
//! - [`tools`]: Named tools with JSON parameters (navigate, click, type_text, ...)
//! - [`testing`]: In-memory browser doubles for tests
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod som;
pub mod testing;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, LaunchOptions, Page, SessionState, Viewport};
pub use dom::{BoundingBox, ElementId, ElementMap, ElementMapStore, InteractiveElement};
pub use error::{BrowserError, Result};
pub use som::{ActionResult, AnnotatedCapture, AnnotationRenderer, ElementAction};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::BrowserServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
