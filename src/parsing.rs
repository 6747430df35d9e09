//! Field rules applied to scraped card text.
//!
//! Everything here is pure: the same input always gives the same output,
//! which keeps the extraction step reproducible on a fixed DOM snapshot.

use crate::error::{CrawlError, Result};
use chrono::{Datelike, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Prefix the site puts in front of dates of edited articles.
pub const DATE_PREFIX: &str = "Last update ";

/// Rendered date layout, e.g. `12 Jul 2024`.
pub const DATE_FORMAT: &str = "%d %b %Y";

static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[\d,]+(\.\d+)?|\d+ dollars|\d+ USD").unwrap());

/// Compute the earliest publish date that is still kept.
///
/// For `number_of_months > 0` the date moves back `number_of_months - 1`
/// calendar months from `today`; the day is then reset to the 1st. Zero and
/// negative windows keep the current month only.
pub fn cutoff_date(today: NaiveDate, number_of_months: i64) -> NaiveDate {
    let mut min_date = today;
    if number_of_months > 0 {
        let back = u32::try_from(number_of_months - 1).unwrap_or(u32::MAX);
        min_date = min_date
            .checked_sub_months(Months::new(back))
            .unwrap_or(NaiveDate::MIN);
    }
    min_date.with_day(1).unwrap_or(min_date)
}

/// Parse a rendered card date such as `"Last update 12 Jul 2024"`.
pub fn parse_publish_date(raw: &str) -> Result<NaiveDate> {
    let cleaned = raw.strip_prefix(DATE_PREFIX).unwrap_or(raw).trim();
    NaiveDate::parse_from_str(cleaned, DATE_FORMAT).map_err(|source| CrawlError::DateParse {
        raw: raw.to_string(),
        source,
    })
}

/// Count case-insensitive, non-overlapping occurrences of `term` across `texts`.
///
/// Absent texts count zero, and so does an empty term.
pub fn count_occurrences(term: &str, texts: &[Option<&str>]) -> usize {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    texts
        .iter()
        .flatten()
        .map(|text| text.to_lowercase().matches(needle.as_str()).count())
        .sum()
}

/// Whether any of `texts` mentions an amount of money.
///
/// Recognised forms: `$1,200`, `$3.50`, `50 dollars`, `50 USD`.
pub fn mentions_money(texts: &[Option<&str>]) -> bool {
    texts.iter().flatten().any(|text| MONEY_RE.is_match(text))
}

/// Thumbnail file name derived from the article title.
///
/// The hash is non-cryptographic and only needs to be stable for a given
/// build, so repeated runs over the same listing write the same files.
pub fn picture_filename(title: &str) -> String {
    let mut hasher = DefaultHasher::new();
    title.hash(&mut hasher);
    format!("{}.png", hasher.finish())
}

/// Collapse whitespace runs the way a browser renders `innerText`.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
