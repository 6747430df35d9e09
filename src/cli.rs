//! Command-line interface definitions for the crawler.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection and input locations can also come from environment variables.

use crate::config::DEFAULT_URL;
use crate::models::{DEFAULT_NUMBER_OF_MONTHS, DEFAULT_SEARCH_TERM};
use clap::Parser;

/// Command-line arguments for the crawler.
///
/// # Examples
///
/// ```sh
/// # One search with the defaults (Olympics, current month)
/// aljazeera_crawler
///
/// # Firefox through geckodriver, three months of results
/// aljazeera_crawler --browser firefox --webdriver-url http://localhost:4444 \
///     --search-term "climate" --number-of-months 3
///
/// # Process a queue of work items
/// aljazeera_crawler --work-items devdata/work-items-in/input/work-items.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Browser to drive: chrome or firefox
    #[arg(short, long, default_value = "chrome")]
    pub browser: String,

    /// WebDriver server (chromedriver or geckodriver)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Home page to start from
    #[arg(short, long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Root output directory
    #[arg(short, long, default_value = "output")]
    pub output_dir: String,

    /// Save a screenshot of the home page under this file name
    #[arg(long)]
    pub screenshot: Option<String>,

    /// JSON file with the input work items
    #[arg(short, long, env = "RC_WORKITEM_INPUT_PATH")]
    pub work_items: Option<String>,

    /// Search term used when no work-item file is given
    #[arg(short, long, default_value = DEFAULT_SEARCH_TERM)]
    pub search_term: String,

    /// Months of results to keep when no work-item file is given
    #[arg(short, long, default_value_t = DEFAULT_NUMBER_OF_MONTHS)]
    pub number_of_months: i64,

    /// Seconds to wait for required page elements
    #[arg(long, default_value_t = 20)]
    pub element_timeout_secs: u64,

    /// Seconds to wait for "show more" to reveal new results
    #[arg(long, default_value_t = 20)]
    pub settle_timeout_secs: u64,
}
