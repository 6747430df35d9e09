//! Error types for the crawler.
//!
//! Missing DOM nodes are not errors: lookups return `Option` and the caller
//! decides whether absence degrades a field or aborts the step. Everything in
//! [`CrawlError`] propagates to the work-item boundary.

use std::time::Duration;
use thiserror::Error;

/// Crawler error type
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Browser '{0}' is not supported")]
    UnsupportedBrowser(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Could not parse publish date '{raw}': {source}")]
    DateParse {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("WebDriver session could not be created: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image download from {url} returned status {status}")]
    Download { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet export failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Archive failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CrawlError>;
