//! Data models for scraped search results.
//!
//! This module defines the structures passed between the crawler stages:
//! - [`SearchRequest`]: What to search for and how far back to look
//! - [`ArticleCard`]: Raw strings lifted from one result card
//! - [`NewsRecord`]: One exported spreadsheet row

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default search term when a work item does not carry one.
pub const DEFAULT_SEARCH_TERM: &str = "Olympics";

/// Default lookback window in months.
pub const DEFAULT_NUMBER_OF_MONTHS: i64 = 1;

/// A single crawl request.
///
/// `number_of_months` is the lookback window: `0` and `1` both mean
/// "current month only", `2` adds the previous month, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchRequest {
    /// The phrase typed into the site search box.
    #[serde(default = "default_search_term")]
    pub search_term: String,
    /// How many calendar months of results to keep.
    #[serde(default = "default_number_of_months")]
    pub number_of_months: i64,
}

fn default_search_term() -> String {
    DEFAULT_SEARCH_TERM.to_string()
}

fn default_number_of_months() -> i64 {
    DEFAULT_NUMBER_OF_MONTHS
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            search_term: default_search_term(),
            number_of_months: default_number_of_months(),
        }
    }
}

/// The raw contents of one result card, before interpretation.
///
/// Every field is optional because promotional tiles and partially rendered
/// cards routinely miss some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleCard {
    /// Headline text of the card link.
    pub title: Option<String>,
    /// Date text as rendered, e.g. `"Last update 12 Jul 2024"`.
    pub date_text: Option<String>,
    /// Excerpt paragraph.
    pub description: Option<String>,
    /// Whether the card carries a thumbnail `<img>` at all.
    pub has_image: bool,
    /// The thumbnail `src`, absolute when a base URL was known.
    pub image_src: Option<String>,
}

/// One scraped article, as exported to the spreadsheet.
///
/// Field order matches the exported column order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    /// The article headline.
    pub title: String,
    /// Publication (or last update) date, if the card showed one.
    pub date: Option<NaiveDate>,
    /// The card excerpt.
    pub description: Option<String>,
    /// File name of the downloaded thumbnail inside the output directory.
    pub picture_filename: Option<String>,
    /// Case-insensitive occurrences of the search term in title and description.
    pub search_phrase_count: usize,
    /// Whether title or description mention an amount of money.
    pub has_money: bool,
}

/// Column headers of the exported sheet, in order.
pub const NEWS_COLUMNS: [&str; 6] = [
    "title",
    "date",
    "description",
    "picture_filename",
    "search_phrase_count",
    "has_money",
];
