//! Al Jazeera search crawler.
//!
//! Drives the site search through a [`Browser`], sorts results by date and
//! walks the result listing card by card until the lookback cutoff.
//!
//! # Flow
//!
//! ```text
//! Searching -> Sorting -> Scanning <-> LoadingMore
//!                             |             |
//!                             +---> Done <--+
//! ```
//!
//! Cards are read as HTML fragments and parsed with `scraper`, so the same
//! rules apply to a live page and to a saved snapshot.

use crate::browser::{self, Browser};
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, Result};
use crate::images::ImageFetcher;
use crate::models::{ArticleCard, NewsRecord, SearchRequest};
use crate::outputs::{archive, xlsx};
use crate::parsing::{
    count_occurrences, cutoff_date, mentions_money, normalize_text, parse_publish_date,
    picture_filename,
};
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Name used for the output sub-directory and the archive.
pub const CRAWLER_NAME: &str = "AlJazeeraCrawler";

const SEARCH_TRIGGER: &str = "div.site-header__search-trigger";
const SEARCH_INPUT: &str = r#"input.search-bar__input[type="text"]"#;
const SEARCH_BUTTON: &str = "div.search-bar__button";
const SORT_SELECT: &str = "#search-sort-option";
const RESULT_LIST: &str = ".search-result__list";
const ARTICLE: &str = "article";
const SHOW_MORE: &str = r#"button[class*="show-more-button"] > span[aria-hidden="true"]"#;

static TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a.u-clickable-card__link:not([href*="tag"])"#).unwrap());
static DATE_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[class*="date-simple"] > span[aria-hidden="true"]"#).unwrap()
});
static DESCRIPTION_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gc__excerpt > p").unwrap());
static IMAGE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Where the crawl currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Searching,
    Sorting,
    Scanning,
    LoadingMore,
    Done,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = normalize_text(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Lift the raw fields out of one result card.
///
/// # Arguments
///
/// * `outer_html` - The card's `<article>` element, serialized with its own tag
/// * `base` - Page URL used to resolve relative thumbnail sources
///
/// # Returns
///
/// An [`ArticleCard`] with whitespace-normalized text. Missing or empty
/// sub-elements are `None`; `has_image` is set whenever an `<img>` exists,
/// even without a usable `src`.
pub fn parse_card(outer_html: &str, base: Option<&Url>) -> ArticleCard {
    let fragment = Html::parse_fragment(outer_html);

    let title = fragment.select(&TITLE_SEL).next().and_then(element_text);
    let date_text = fragment.select(&DATE_SEL).next().and_then(element_text);
    let description = fragment.select(&DESCRIPTION_SEL).next().and_then(element_text);

    let image = fragment.select(&IMAGE_SEL).next();
    let image_src = image
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(|src| match base.and_then(|b| b.join(src).ok()) {
            Some(resolved) => resolved.to_string(),
            None => src.to_string(),
        });

    ArticleCard {
        title,
        date_text,
        description,
        has_image: image.is_some(),
        image_src,
    }
}

/// Turn a parsed card into a record.
///
/// # Arguments
///
/// * `card` - Fields lifted by [`parse_card`]
/// * `search_term` - Term counted case-insensitively in title and description
///
/// # Returns
///
/// `Ok(None)` for cards without a title (promos, tag links), otherwise the
/// record with its picture file name, keyword count and money flag.
///
/// # Errors
///
/// Returns [`CrawlError::DateParse`] if a date is present but unreadable.
pub fn build_record(card: &ArticleCard, search_term: &str) -> Result<Option<NewsRecord>> {
    let Some(title) = card.title.clone() else {
        return Ok(None);
    };

    let date = card
        .date_text
        .as_deref()
        .map(parse_publish_date)
        .transpose()?;
    let description = card.description.clone();
    let texts = [Some(title.as_str()), description.as_deref()];

    Ok(Some(NewsRecord {
        picture_filename: card.has_image.then(|| picture_filename(&title)),
        search_phrase_count: count_occurrences(search_term, &texts),
        has_money: mentions_money(&texts),
        date,
        description,
        title,
    }))
}

/// Search crawler bound to one browser session.
pub struct AlJazeeraCrawler<B, F> {
    browser: B,
    fetcher: F,
    config: CrawlerConfig,
}

impl<B, F> fmt::Debug for AlJazeeraCrawler<B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlJazeeraCrawler")
            .field("config", &self.config)
            .finish()
    }
}

impl<B, F> AlJazeeraCrawler<B, F>
where
    B: Browser,
    F: ImageFetcher,
{
    pub fn new(browser: B, fetcher: F, config: CrawlerConfig) -> Self {
        Self {
            browser,
            fetcher,
            config,
        }
    }

    /// Directory holding this crawler's spreadsheet, images and log.
    pub fn output_path(&self) -> PathBuf {
        self.config.output_dir.join(CRAWLER_NAME)
    }

    /// Location of the zip bundle of [`Self::output_path`].
    pub fn archive_path(&self) -> PathBuf {
        self.config
            .output_dir
            .join(format!("output_{CRAWLER_NAME}.zip"))
    }

    #[cfg(test)]
    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Open the home page, optionally screenshot it, and size the viewport.
    #[instrument(level = "info", skip(self))]
    pub async fn setup_home_page(&self, screenshot: Option<&str>) -> Result<()> {
        self.browser.navigate(&self.config.url).await?;

        if let Some(name) = screenshot {
            let png = self.browser.screenshot().await?;
            let path = self.output_path().join(name);
            tokio::fs::write(&path, png).await?;
            info!(path = %path.display(), "Saved screenshot");
        }

        let (width, height) = self.config.viewport;
        browser::set_page_size(&self.browser, width, height).await?;
        info!("Al Jazeera News page opened successfully.");
        Ok(())
    }

    /// Search, sort by date, collect rows and export them.
    #[instrument(level = "info", skip(self, request), fields(term = %request.search_term, months = request.number_of_months))]
    pub async fn search_news(&self, request: &SearchRequest) -> Result<Vec<NewsRecord>> {
        info!(
            "Searching news for term {} for the last {} month(s).",
            request.search_term, request.number_of_months
        );
        self.search_by_term(&request.search_term).await?;
        self.sort_results("Date").await?;

        let today = Local::now().date_naive();
        let news = self.collect_news(request, today).await?;

        xlsx::write_news(&self.output_path().join(xlsx::NEWS_FILENAME), &news).await?;
        Ok(news)
    }

    /// Bundle the output directory into [`Self::archive_path`].
    ///
    /// # Returns
    ///
    /// The number of files written to the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or the archive
    /// cannot be written.
    pub fn zip_output(&self) -> Result<usize> {
        archive::zip_output(&self.output_path(), &self.archive_path())
    }

    /// End the browser session.
    pub async fn quit(&self) -> Result<()> {
        self.browser.quit().await
    }

    async fn require(&self, scope: Option<&B::Node>, selector: &str) -> Result<B::Node> {
        browser::wait_for(
            &self.browser,
            scope,
            selector,
            self.config.element_timeout,
            self.config.poll_interval,
        )
        .await
    }

    #[instrument(level = "info", skip(self))]
    async fn search_by_term(&self, search_term: &str) -> Result<()> {
        debug!(state = %CrawlState::Searching, "Entering state");
        let trigger = self.require(None, SEARCH_TRIGGER).await?;
        self.browser.click(&trigger).await?;

        let input = self.require(None, SEARCH_INPUT).await?;
        self.browser.type_text(&input, search_term).await?;

        let button = self.require(None, SEARCH_BUTTON).await?;
        self.browser.click(&button).await
    }

    /// Pick `sort_by` in the sort dropdown and wait until the dropdown
    /// reports it as selected.
    #[instrument(level = "info", skip(self))]
    async fn sort_results(&self, sort_by: &str) -> Result<()> {
        debug!(state = %CrawlState::Sorting, "Entering state");
        let container = self.require(None, SORT_SELECT).await?;
        self.browser.click(&container).await?;

        let value = sort_by.to_lowercase();
        let option = format!(r#"option[value="{value}"]"#);
        let choice = self
            .browser
            .find(Some(&container), &option)
            .await?
            .ok_or_else(|| CrawlError::ElementNotFound(option.clone()))?;
        self.browser.click(&choice).await?;

        browser::wait_for_property(
            &self.browser,
            &container,
            "value",
            &value,
            self.config.element_timeout,
            self.config.poll_interval,
        )
        .await?;
        info!(sort = %value, "Results sorted");
        Ok(())
    }

    /// Walk the result listing and collect records until the cutoff.
    ///
    /// Cards are read in listing order; when the visible cards run out the
    /// "show more" control is clicked and the walk continues with the newly
    /// revealed cards only.
    ///
    /// # Arguments
    ///
    /// * `request` - Search term and lookback window in months
    /// * `today` - Reference date for the cutoff
    ///
    /// # Returns
    ///
    /// Records in discovery order. The first dated record older than the
    /// cutoff ends the walk and is dropped; a record dated exactly on the
    /// cutoff is kept. Undated records never end the walk.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Timeout`] if the listing never appears or a
    /// "show more" click reveals nothing, and propagates date, download and
    /// browser failures.
    #[instrument(level = "info", skip(self, request), fields(term = %request.search_term))]
    pub async fn collect_news(&self, request: &SearchRequest, today: NaiveDate) -> Result<Vec<NewsRecord>> {
        let min_date = cutoff_date(today, request.number_of_months);
        info!(%min_date, "Computed cutoff date");

        let container = self.require(None, RESULT_LIST).await?;
        let base = Url::parse(&self.browser.current_url().await?).ok();

        let mut news = Vec::new();
        let mut processed = 0usize;
        let mut pending: VecDeque<B::Node> =
            self.browser.find_all(Some(&container), ARTICLE).await?.into();
        let mut state = if pending.is_empty() {
            CrawlState::Done
        } else {
            CrawlState::Scanning
        };
        debug!(%state, items = pending.len(), "Entering state");

        loop {
            match state {
                CrawlState::Scanning => {
                    let Some(item) = pending.pop_front() else {
                        state = CrawlState::LoadingMore;
                        debug!(%state, processed, "Entering state");
                        continue;
                    };
                    processed += 1;

                    let Some(record) = self
                        .scrape_news_item(&item, &request.search_term, base.as_ref())
                        .await?
                    else {
                        continue;
                    };
                    if record.date.is_some_and(|date| date < min_date) {
                        info!(title = %record.title, "Reached the minimum date.");
                        state = CrawlState::Done;
                        continue;
                    }
                    news.push(record);
                }
                CrawlState::LoadingMore => {
                    let Some(show_more) = self.browser.find(Some(&container), SHOW_MORE).await?
                    else {
                        info!("No more results to load");
                        state = CrawlState::Done;
                        continue;
                    };
                    self.browser.scroll_into_view(&show_more).await?;
                    self.browser.click(&show_more).await?;
                    info!("Loading more news items...");

                    let items = browser::wait_for_more(
                        &self.browser,
                        Some(&container),
                        ARTICLE,
                        processed,
                        self.config.settle_timeout,
                        self.config.poll_interval,
                    )
                    .await?;
                    pending = items.into_iter().skip(processed).collect();
                    state = CrawlState::Scanning;
                    debug!(%state, items = pending.len(), "Entering state");
                }
                CrawlState::Done | CrawlState::Searching | CrawlState::Sorting => break,
            }
        }

        info!(count = news.len(), processed, "Collected news items");
        Ok(news)
    }

    async fn scrape_news_item(
        &self,
        item: &B::Node,
        search_term: &str,
        base: Option<&Url>,
    ) -> Result<Option<NewsRecord>> {
        self.browser.scroll_into_view(item).await?;
        let html = self.browser.outer_html(item).await?;
        let card = parse_card(&html, base);

        let Some(record) = build_record(&card, search_term)? else {
            warn!("Card has no title; skipping");
            return Ok(None);
        };

        if let (Some(filename), Some(src)) = (&record.picture_filename, &card.image_src) {
            let dest = self.output_path().join(filename);
            self.fetcher.fetch(src, &dest).await?;
        }
        debug!(title = %record.title, date = ?record.date, "Scraped news item");
        Ok(Some(record))
    }
}
