//! One-shot Set-of-Marks capture
//!
//! Opens a URL, writes the annotated screenshot as PNG and the element map
//! as JSON, then closes the browser.

use browser_control::{BrowserSession, LaunchOptions};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "som-capture")]
#[command(version)]
#[command(about = "Capture an annotated Set-of-Marks screenshot of a page", long_about = None)]
struct Cli {
    /// Page to capture; a missing scheme is filled in
    url: String,

    /// Where to write the annotated PNG
    #[arg(long, short = 'o', default_value = "som.png")]
    output: PathBuf,

    /// Where to write the element map as JSON
    #[arg(long, short = 'm', default_value = "som.json")]
    map: PathBuf,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Viewport width in pixels
    #[arg(long, env = "BROWSER_VIEWPORT_WIDTH", default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, env = "BROWSER_VIEWPORT_HEIGHT", default_value_t = 720)]
    height: u32,

    /// Profile directory (default: ~/.browser-control/profile)
    #[arg(long, env = "BROWSER_USER_DATA_DIR", value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Path to custom browser executable
    #[arg(long, env = "BROWSER_EXECUTABLE_PATH", value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Extra wait after the page loads, in milliseconds
    #[arg(long, default_value_t = 500)]
    settle_ms: u64,

    /// Print the element listing to stdout
    #[arg(long, short = 'l')]
    list: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LOG_LEVEL", "warn")).init();

    let cli = Cli::parse();

    let mut options = LaunchOptions::new().headless(!cli.headed).viewport(cli.width, cli.height);
    if let Some(dir) = &cli.user_data_dir {
        options = options.user_data_dir(dir);
    }
    if let Some(path) = &cli.executable_path {
        options = options.chrome_path(path);
    }

    let mut session = BrowserSession::new(options);
    let url = session.navigate(&cli.url)?;
    std::thread::sleep(Duration::from_millis(cli.settle_ms));

    let capture = session.capture_annotated()?;
    std::fs::write(&cli.output, &capture.image)?;
    std::fs::write(&cli.map, capture.map.to_json()?)?;
    session.stop();

    eprintln!(
        "Captured {} elements from {} -> {} ({})",
        capture.map.len(),
        url,
        cli.output.display(),
        cli.map.display()
    );

    if cli.list {
        println!("{}", capture.map.describe());
    }

    Ok(())
}
