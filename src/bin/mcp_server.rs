//! Browser-control MCP Server
//!
//! This binary provides a Model Context Protocol (MCP) server for Set-of-Marks browser control.
//! One browser session is shared by every connection the process accepts.

use browser_control::browser::{BrowserSession, LaunchOptions};
use browser_control::mcp::BrowserServer;
use clap::{Parser, ValueEnum};
use rmcp::{
    ServiceExt,
    transport::{
        sse_server::{SseServer, SseServerConfig},
        stdio,
        streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
    },
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// Server-Sent Events transport
    Sse,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "browser-control-mcp")]
#[command(version)]
#[command(about = "Set-of-Marks browser control MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Run headless; `BROWSER_HEADLESS=false` is the same as --headed
    #[arg(
        long,
        env = "BROWSER_HEADLESS",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new(),
        hide = true
    )]
    headless: bool,

    /// Viewport width in pixels
    #[arg(long, env = "BROWSER_VIEWPORT_WIDTH", default_value_t = 1280)]
    viewport_width: u32,

    /// Viewport height in pixels
    #[arg(long, env = "BROWSER_VIEWPORT_HEIGHT", default_value_t = 720)]
    viewport_height: u32,

    /// Unpacked extension to load (ignored if the path does not exist)
    #[arg(long, env = "BROWSER_EXTENSION_PATH", value_name = "DIR")]
    extension_path: Option<PathBuf>,

    /// Persistent browser profile directory (default: ~/.browser-control/profile)
    #[arg(long, env = "BROWSER_USER_DATA_DIR", value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Path to custom browser executable
    #[arg(long, env = "BROWSER_EXECUTABLE_PATH", value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Timeout for a single navigation or input action, in milliseconds
    #[arg(long, env = "BROWSER_ACTION_TIMEOUT_MS", default_value_t = 30_000)]
    action_timeout_ms: u64,

    /// Log filter, e.g. "info" or "browser_control=debug"
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for SSE or HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// SSE endpoint path (default: /sse)
    #[arg(long, default_value = "/sse")]
    sse_path: String,

    /// SSE POST path for messages (default: /message)
    #[arg(long, default_value = "/message")]
    sse_post_path: String,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

impl Cli {
    fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new()
            .headless(self.headless && !self.headed)
            .viewport(self.viewport_width, self.viewport_height)
            .action_timeout(Duration::from_millis(self.action_timeout_ms));

        if let Some(dir) = &self.user_data_dir {
            options = options.user_data_dir(dir);
        }
        if let Some(path) = &self.extension_path {
            options = options.extension_path(path);
        }
        if let Some(path) = &self.executable_path {
            options = options.chrome_path(path);
        }

        options
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout carries the stdio transport, so logs go to stderr
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    let options = cli.launch_options();

    log::info!("Browser-control MCP Server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" });
    log::info!("Viewport: {}x{}", options.viewport.width, options.viewport.height);
    if let Some(dir) = &options.user_data_dir {
        log::info!("User data directory: {}", dir.display());
    }

    let session = Arc::new(Mutex::new(BrowserSession::new(options)));

    // Best effort: tools start the browser lazily if this fails
    if let Err(e) = session.lock().unwrap_or_else(|p| p.into_inner()).start() {
        log::warn!("Browser did not start yet: {}", e);
    }

    let served = serve(&cli, session.clone()).await;

    session.lock().unwrap_or_else(|p| p.into_inner()).stop();
    log::info!("Cleanup complete, exiting...");

    served
}

async fn serve(cli: &Cli, session: Arc<Mutex<BrowserSession>>) -> Result<(), Box<dyn std::error::Error>> {
    match cli.transport {
        Transport::Stdio => {
            log::info!("Transport: stdio");
            let server = BrowserServer::from_shared(session).serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Sse => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);
            let ct = CancellationToken::new();

            let config = SseServerConfig {
                bind: bind_addr.parse()?,
                sse_path: cli.sse_path.clone(),
                post_path: cli.sse_post_path.clone(),
                ct: ct.clone(),
                sse_keep_alive: None,
            };

            let (sse_server, router) = SseServer::new(config);

            // Every connection gets a server over the same session
            let _connections = sse_server.with_service(move || BrowserServer::from_shared(session.clone()));

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.sse_path);

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(shutdown_signal(ct))
                .await?;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let service_factory = move || Ok::<_, std::io::Error>(BrowserServer::from_shared(session.clone()));

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal(CancellationToken::new()))
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_signal(ct: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
    }
    ct.cancel();
}
