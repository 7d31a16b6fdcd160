//! Browser session management
//!
//! The session owns exactly one persistent browsing context and one active
//! page. Everything else in the crate reaches the browser through the
//! [`Page`] capability trait, so the engine can be swapped for a test double.

pub mod backend;
pub mod config;
pub mod page;
pub mod session;
pub mod url;

pub use backend::{BrowserBackend, BrowserContext, ChromeBackend, ChromeContext};
pub use config::{LaunchOptions, Viewport};
pub use page::{ChromePage, Page};
pub use session::{BrowserSession, ScrollDirection, SessionState};
