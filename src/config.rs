//! Runtime configuration shared by the crawler stages.

use crate::cli::Cli;
use std::path::PathBuf;
use std::time::Duration;

/// Home page opened at the start of every session.
pub const DEFAULT_URL: &str = "https://www.aljazeera.com/";

/// Settings for one crawler instance.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Site home page.
    pub url: String,
    /// Root of all output; each crawler writes into a sub-directory.
    pub output_dir: PathBuf,
    /// Upper bound when waiting for a required element to appear.
    pub element_timeout: Duration,
    /// Upper bound when waiting for "show more" to reveal new results.
    pub settle_timeout: Duration,
    /// Delay between two polls of the page.
    pub poll_interval: Duration,
    /// Viewport size the window is resized to.
    pub viewport: (u32, u32),
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            output_dir: PathBuf::from("output"),
            element_timeout: Duration::from_secs(20),
            settle_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(250),
            viewport: (1920, 1080),
        }
    }
}

impl From<&Cli> for CrawlerConfig {
    fn from(args: &Cli) -> Self {
        Self {
            url: args.url.clone(),
            output_dir: PathBuf::from(&args.output_dir),
            element_timeout: Duration::from_secs(args.element_timeout_secs),
            settle_timeout: Duration::from_secs(args.settle_timeout_secs),
            ..Default::default()
        }
    }
}
