//! # Al Jazeera Crawler
//!
//! Searches Al Jazeera for a term, sorts the results by date, walks the
//! result listing until a month-based cutoff and exports one spreadsheet row
//! per article.
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=4444 &
//! aljazeera_crawler --search-term Olympics --number-of-months 2
//! ```
//!
//! ## Pipeline
//!
//! 1. **Setup**: Start a WebDriver session and open the home page
//! 2. **Search**: Submit the term and sort the results by date
//! 3. **Collect**: Walk result cards, download thumbnails, stop at the cutoff
//! 4. **Output**: Write `news.xlsx`, then zip the output directory
//!
//! Steps 2–4 run once per input work item, strictly in sequence.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{error, info, warn};

mod browser;
mod cli;
mod config;
mod error;
mod images;
mod models;
mod outputs;
mod parsing;
mod scrapers;
mod utils;
mod workitems;

use browser::webdriver::USER_AGENT;
use browser::{Browser, BrowserKind, WebDriverBrowser};
use cli::Cli;
use config::CrawlerConfig;
use error::CrawlError;
use images::{HttpImageFetcher, ImageFetcher};
use models::SearchRequest;
use scrapers::aljazeera::{AlJazeeraCrawler, CRAWLER_NAME};
use utils::{LOG_FILENAME, ensure_writable_dir, init_tracing};
use workitems::{OUTCOMES_FILENAME, WorkItem, WorkItemOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let config = CrawlerConfig::from(&args);

    // The run log lives inside the output directory, so it must exist first.
    let output_path = config.output_dir.join(CRAWLER_NAME);
    ensure_writable_dir(&output_path).await?;
    init_tracing(&output_path.join(LOG_FILENAME))?;

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "aljazeera_crawler starting up");

    let kind: BrowserKind = args.browser.parse()?;

    let fallback = SearchRequest {
        search_term: args.search_term.clone(),
        number_of_months: args.number_of_months,
    };
    let items = workitems::load_inputs(args.work_items.as_deref().map(Path::new), &fallback).await?;

    let fetcher = HttpImageFetcher::new(USER_AGENT)?;
    let browser = WebDriverBrowser::launch(kind, &args.webdriver_url).await?;
    let crawler = AlJazeeraCrawler::new(browser, fetcher, config.clone());

    let outcomes = process_items(&crawler, &items, args.screenshot.as_deref()).await;

    if let Err(e) = crawler.quit().await {
        warn!(error = %e, "Failed to close browser session");
    }

    workitems::write_outcomes(&config.output_dir.join(OUTCOMES_FILENAME), &outcomes).await?;

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        total = outcomes.len(),
        failed,
        "Execution complete"
    );

    if failed > 0 {
        return Err(format!("{failed} of {} work item(s) failed", outcomes.len()).into());
    }
    Ok(())
}

/// Run every work item against one open session.
///
/// A failing item is logged and reported; the remaining items still run. If
/// the home page cannot be opened, every item fails with that error.
async fn process_items<B, F>(
    crawler: &AlJazeeraCrawler<B, F>,
    items: &[WorkItem],
    screenshot: Option<&str>,
) -> Vec<WorkItemOutcome>
where
    B: Browser,
    F: ImageFetcher,
{
    if let Err(e) = crawler.setup_home_page(screenshot).await {
        error!(error = %e, "Could not open the home page");
        return items.iter().map(|item| WorkItemOutcome::failed(item, &e)).collect();
    }

    let mut outcomes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match process_item(crawler, item).await {
            Ok(count) => {
                info!(index, records = count, "Work item done");
                outcomes.push(WorkItemOutcome::done(item, count));
            }
            Err(e) => {
                error!(index, error = %e, "Work item failed");
                outcomes.push(WorkItemOutcome::failed(item, &e));
            }
        }
    }
    outcomes
}

async fn process_item<B, F>(crawler: &AlJazeeraCrawler<B, F>, item: &WorkItem) -> Result<usize, CrawlError>
where
    B: Browser,
    F: ImageFetcher,
{
    let request = item.request()?;
    let news = crawler.search_news(&request).await?;
    crawler.zip_output()?;
    Ok(news.len())
}
