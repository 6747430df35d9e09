//! Generic browser automation capability.
//!
//! The crawler only talks to a page through the [`Browser`] trait, so the
//! site-specific code holds selectors and parsing rules and nothing else.
//!
//! # Implementations
//!
//! | Type | Module | Notes |
//! |------|--------|-------|
//! | [`WebDriverBrowser`] | [`webdriver`] | Chrome or Firefox over the WebDriver protocol |
//! | `FakeBrowser` | `fake` | Static HTML snapshots, tests only |
//!
//! Selectors are CSS. Lookups that match nothing return `None` or an empty
//! list; only transport and protocol failures are errors.

use crate::error::{CrawlError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument};

pub mod webdriver;

#[cfg(test)]
pub mod fake;

pub use webdriver::WebDriverBrowser;

/// Browser families the crawler can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    /// Chromium family, driven through chromedriver.
    Chrome,
    /// Gecko family, driven through geckodriver.
    Firefox,
}

impl FromStr for BrowserKind {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            _ => Err(CrawlError::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chrome => write!(f, "Chrome"),
            Self::Firefox => write!(f, "Firefox"),
        }
    }
}

/// A live page that can be navigated, queried and clicked.
///
/// `scope` arguments restrict a lookup to the descendants of a node; `None`
/// searches the whole document.
pub trait Browser {
    /// Handle to an element of the current page.
    type Node: Clone + fmt::Debug;

    /// Load `url` in the session and wait for navigation to finish.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// URL of the current document.
    async fn current_url(&self) -> Result<String>;

    /// First element matching `selector`, if any.
    async fn find(&self, scope: Option<&Self::Node>, selector: &str) -> Result<Option<Self::Node>>;

    /// Every element matching `selector`, in document order.
    async fn find_all(&self, scope: Option<&Self::Node>, selector: &str) -> Result<Vec<Self::Node>>;

    async fn click(&self, node: &Self::Node) -> Result<()>;

    async fn type_text(&self, node: &Self::Node, text: &str) -> Result<()>;

    /// Current DOM property of the node, such as a form control's `value`.
    async fn property(&self, node: &Self::Node, name: &str) -> Result<Option<String>>;

    /// Serialized HTML of the node including its own tag.
    async fn outer_html(&self, node: &Self::Node) -> Result<String>;

    async fn scroll_into_view(&self, node: &Self::Node) -> Result<()>;

    /// Outer window size in pixels.
    async fn window_size(&self) -> Result<(u32, u32)>;

    /// Inner size of the document viewport in pixels.
    async fn viewport_size(&self) -> Result<(u32, u32)>;

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()>;

    /// PNG bytes of the visible viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the session. The handle must not be used afterwards.
    async fn quit(&self) -> Result<()>;
}

/// Poll until `selector` matches, or fail with [`CrawlError::Timeout`].
#[instrument(level = "debug", skip(browser, scope))]
pub async fn wait_for<B: Browser>(
    browser: &B,
    scope: Option<&B::Node>,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<B::Node> {
    let t0 = Instant::now();
    loop {
        if let Some(node) = browser.find(scope, selector).await? {
            debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Element present");
            return Ok(node);
        }
        if t0.elapsed() >= timeout {
            return Err(CrawlError::Timeout {
                what: format!("element '{selector}'"),
                after: timeout,
            });
        }
        sleep(interval).await;
    }
}

/// Poll until `selector` matches more than `seen` elements.
///
/// Returns the full match list once it has grown.
#[instrument(level = "debug", skip(browser, scope))]
pub async fn wait_for_more<B: Browser>(
    browser: &B,
    scope: Option<&B::Node>,
    selector: &str,
    seen: usize,
    timeout: Duration,
    interval: Duration,
) -> Result<Vec<B::Node>> {
    let t0 = Instant::now();
    loop {
        let nodes = browser.find_all(scope, selector).await?;
        if nodes.len() > seen {
            debug!(count = nodes.len(), seen, "New elements revealed");
            return Ok(nodes);
        }
        if t0.elapsed() >= timeout {
            return Err(CrawlError::Timeout {
                what: format!("more than {seen} '{selector}' elements"),
                after: timeout,
            });
        }
        sleep(interval).await;
    }
}

/// Poll until the DOM property `name` of `node` equals `expected`.
#[instrument(level = "debug", skip(browser, node))]
pub async fn wait_for_property<B: Browser>(
    browser: &B,
    node: &B::Node,
    name: &str,
    expected: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let t0 = Instant::now();
    loop {
        let current = browser.property(node, name).await?;
        if current.as_deref() == Some(expected) {
            debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Property settled");
            return Ok(());
        }
        if t0.elapsed() >= timeout {
            return Err(CrawlError::Timeout {
                what: format!("{name} to become '{expected}' (last {current:?})"),
                after: timeout,
            });
        }
        sleep(interval).await;
    }
}

/// Resize the window so the document viewport is exactly `width` x `height`.
///
/// The difference between window and viewport (toolbars, borders) is added
/// on top of the requested size.
#[instrument(level = "info", skip(browser))]
pub async fn set_page_size<B: Browser>(browser: &B, width: u32, height: u32) -> Result<()> {
    let (window_width, window_height) = browser.window_size().await?;
    let (inner_width, inner_height) = browser.viewport_size().await?;

    let target_width = width + window_width.saturating_sub(inner_width);
    let target_height = height + window_height.saturating_sub(inner_height);
    debug!(target_width, target_height, "Resizing window");
    browser.set_window_size(target_width, target_height).await
}

#[cfg(test)]
mod tests {
    use super::fake::FakeBrowser;
    use super::*;

    #[test]
    fn test_browser_kind_parsing() {
        assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("FIREFOX".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
    }

    #[test]
    fn test_browser_kind_unsupported() {
        let err = "Safari".parse::<BrowserKind>().unwrap_err();
        assert!(matches!(err, CrawlError::UnsupportedBrowser(ref name) if name == "Safari"));
    }

    #[tokio::test]
    async fn test_wait_for_present() {
        let browser = FakeBrowser::new(vec![r#"<div id="a"><p>x</p></div>"#.to_string()]);
        let node = wait_for(
            &browser,
            None,
            "#a",
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
        assert!(browser.outer_html(&node).await.unwrap().contains("<p>x</p>"));
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let browser = FakeBrowser::new(vec!["<div></div>".to_string()]);
        let err = wait_for(
            &browser,
            None,
            "#missing",
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CrawlError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_wait_for_more_times_out_without_growth() {
        let browser = FakeBrowser::new(vec!["<ul><li>1</li></ul>".to_string()]);
        let err = wait_for_more(
            &browser,
            None,
            "li",
            1,
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CrawlError::Timeout { .. }));
    }

    const SORT_SELECT_HTML: &str = r#"<select id="sort"><option value="relevance">Relevance</option><option value="date">Date</option></select>"#;

    #[tokio::test]
    async fn test_wait_for_property_after_selection() {
        let browser = FakeBrowser::new(vec![SORT_SELECT_HTML.to_string()]);
        let select = browser.find(None, "#sort").await.unwrap().unwrap();
        assert_eq!(
            browser.property(&select, "value").await.unwrap().as_deref(),
            Some("relevance")
        );

        let option = browser
            .find(Some(&select), r#"option[value="date"]"#)
            .await
            .unwrap()
            .unwrap();
        browser.click(&option).await.unwrap();

        wait_for_property(
            &browser,
            &select,
            "value",
            "date",
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_property_times_out_when_unchanged() {
        let browser = FakeBrowser::new(vec![SORT_SELECT_HTML.to_string()]);
        let select = browser.find(None, "#sort").await.unwrap().unwrap();

        let err = wait_for_property(
            &browser,
            &select,
            "value",
            "date",
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CrawlError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_set_page_size_adds_chrome_delta() {
        let browser = FakeBrowser::new(vec!["<html></html>".to_string()]);
        browser.set_window_metrics((1000, 800), (990, 700));
        set_page_size(&browser, 1920, 1080).await.unwrap();
        assert_eq!(browser.window_size().await.unwrap(), (1930, 1180));
    }
}
