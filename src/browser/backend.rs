use crate::browser::config::LaunchOptions;
use crate::browser::page::{ChromePage, Page};
use crate::error::{BrowserError, Result};
use headless_chrome::Browser;
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::time::Duration;

/// A launched persistent browsing context
pub trait BrowserContext: Send {
    /// Pages already open in the context
    fn pages(&self) -> Result<Vec<Arc<dyn Page>>>;

    /// Open a new page
    fn new_page(&self) -> Result<Arc<dyn Page>>;

    /// Close the context and the underlying engine
    fn close(&mut self) -> Result<()>;
}

/// Something that can launch a persistent browsing context
pub trait BrowserBackend: Send + Sync {
    fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserContext>>;
}

/// Launches Chrome/Chromium through headless_chrome
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeBackend;

impl BrowserBackend for ChromeBackend {
    fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserContext>> {
        let extension_args: Vec<OsString> = match options.existing_extension() {
            Some(path) => {
                log::info!("Loading extension from: {}", path.display());
                let mut except = OsString::from("--disable-extensions-except=");
                except.push(path);
                let mut load = OsString::from("--load-extension=");
                load.push(path);
                vec![except, load]
            }
            None => {
                if let Some(path) = &options.extension_path {
                    log::warn!("Extension path {} does not exist, ignoring", path.display());
                }
                Vec::new()
            }
        };

        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        launch_opts.args.push(OsStr::new("--no-first-run"));
        launch_opts.args.push(OsStr::new("--no-default-browser-check"));

        // Keep the browser alive between agent commands (default idle timeout is 30 seconds)
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.sandbox = options.sandbox;
        launch_opts.window_size = Some((options.viewport.width, options.viewport.height));

        if let Some(path) = &options.chrome_path {
            launch_opts.path = Some(path.clone());
        }

        if let Some(dir) = &options.user_data_dir {
            launch_opts.user_data_dir = Some(dir.clone());
        }

        if !extension_args.is_empty() {
            launch_opts.ignore_default_args.push(OsStr::new("--disable-extensions"));
            launch_opts.args.extend(extension_args.iter().map(OsString::as_os_str));
        }

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::SessionStartFailed(e.to_string()))?;

        Ok(Box::new(ChromeContext {
            browser: Some(browser),
            action_timeout: options.action_timeout,
        }))
    }
}

/// A running Chrome instance
pub struct ChromeContext {
    browser: Option<Browser>,
    action_timeout: Duration,
}

impl ChromeContext {
    fn browser(&self) -> Result<&Browser> {
        self.browser.as_ref().ok_or(BrowserError::SessionNotStarted)
    }
}

impl BrowserContext for ChromeContext {
    fn pages(&self) -> Result<Vec<Arc<dyn Page>>> {
        let tabs = self
            .browser()?
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::SessionStartFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs
            .into_iter()
            .map(|tab| Arc::new(ChromePage::new(tab, self.action_timeout)) as Arc<dyn Page>)
            .collect())
    }

    fn new_page(&self) -> Result<Arc<dyn Page>> {
        let tab = self
            .browser()?
            .new_tab()
            .map_err(|e| BrowserError::SessionStartFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Arc::new(ChromePage::new(tab, self.action_timeout)))
    }

    fn close(&mut self) -> Result<()> {
        // headless_chrome has no explicit close; dropping the Browser kills the process
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };

        let tabs = browser
            .get_tabs()
            .lock()
            .map(|tabs| tabs.clone())
            .unwrap_or_default();

        let mut first_error = None;
        for tab in tabs {
            if let Err(e) = tab.close(false) {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }

        drop(browser);

        match first_error {
            Some(reason) => Err(BrowserError::ActionFailed {
                action: "close".to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}
