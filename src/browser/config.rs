use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default viewport width in CSS pixels
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default viewport height in CSS pixels
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

/// Default timeout for a single input action
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Visible pixel region of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// Options for launching the persistent browser context.
///
/// These are fixed inputs: a session copies them when it is created and
/// never changes them afterwards.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    /// Fixed viewport size; also used as the browser window size
    pub viewport: Viewport,

    /// Profile directory so cookies and logins survive restarts
    pub user_data_dir: Option<PathBuf>,

    /// Unpacked extension to load into the browser
    pub extension_path: Option<PathBuf>,

    /// Chrome/Chromium binary, auto-detected when unset
    pub chrome_path: Option<PathBuf>,

    /// Enable Chrome's sandbox
    pub sandbox: bool,

    /// Upper bound for a single navigation or input action
    pub action_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_data_dir: Some(default_user_data_dir()),
            extension_path: None,
            chrome_path: None,
            sandbox: true,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set viewport size
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Builder method: set the profile directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: load an unpacked extension
    pub fn extension_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extension_path = Some(path.into());
        self
    }

    /// Builder method: set Chrome binary path
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set sandbox mode
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Builder method: set the action timeout
    pub fn action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// The extension path, if one is configured and present on disk
    pub fn existing_extension(&self) -> Option<&PathBuf> {
        self.extension_path.as_ref().filter(|path| path.exists())
    }
}

/// `~/.browser-control/profile`, or a temp directory when no home is known
pub fn default_user_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".browser-control")
        .join("profile")
}
