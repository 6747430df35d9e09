//! Spreadsheet export of collected news rows.
//!
//! One worksheet, one header row, one row per [`NewsRecord`] in discovery
//! order. Missing values are left as empty cells.

use crate::error::Result;
use crate::models::{NEWS_COLUMNS, NewsRecord};
use chrono::Datelike;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// File name of the spreadsheet inside the crawler output directory.
pub const NEWS_FILENAME: &str = "news.xlsx";

/// Build the workbook bytes for `records`.
pub fn news_workbook(records: &[NewsRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let sheet = workbook.add_worksheet();
    for (col, name) in NEWS_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    sheet.set_column_width(0, 60)?;
    sheet.set_column_width(1, 12)?;
    sheet.set_column_width(2, 80)?;
    sheet.set_column_width(3, 24)?;

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, record.title.as_str())?;
        if let Some(date) = record.date {
            let excel_date =
                ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
            sheet.write_datetime_with_format(row, 1, &excel_date, &date_format)?;
        }
        if let Some(description) = &record.description {
            sheet.write_string(row, 2, description.as_str())?;
        }
        if let Some(picture) = &record.picture_filename {
            sheet.write_string(row, 3, picture.as_str())?;
        }
        sheet.write_number(row, 4, record.search_phrase_count as f64)?;
        sheet.write_boolean(row, 5, record.has_money)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write `records` to `path` as an `.xlsx` workbook.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = records.len()))]
pub async fn write_news(path: &Path, records: &[NewsRecord]) -> Result<()> {
    let bytes = news_workbook(records)?;
    fs::write(path, bytes).await?;
    info!("News saved to Excel successfully.");
    Ok(())
}
