//! WebDriver-backed browser session.
//!
//! Drives Chrome through chromedriver or Firefox through geckodriver with
//! `fantoccini`. Both run headless with a fixed user agent and with the usual
//! automation markers suppressed.

use super::{Browser, BrowserKind};
use crate::error::Result;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

/// User agent sent by every session.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.50 Safari/537.36";

/// Arguments shared by both browser families.
const COMMON_ARGS: [&str; 8] = [
    "--headless",
    "--no-sandbox",
    "--disable-extensions",
    "--disable-web-security",
    "--start-maximized",
    "--disable-gpu",
    "--ignore-certificate-errors",
    "--allow-running-insecure-content",
];

const HIDE_WEBDRIVER_JS: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

const VIEWPORT_JS: &str = "return [document.documentElement.clientWidth, document.documentElement.clientHeight];";

const SCROLL_INTO_VIEW_JS: &str = "arguments[0].scrollIntoView();";

/// Build the WebDriver capabilities for a browser family.
pub fn capabilities(kind: BrowserKind, user_agent: &str) -> Map<String, Value> {
    let mut args: Vec<String> = COMMON_ARGS.iter().map(|a| a.to_string()).collect();
    args.push(format!("--user-agent={user_agent}"));

    let mut caps = Map::new();
    match kind {
        BrowserKind::Chrome => {
            args.push("--disable-dev-shm-usage".to_string());
            args.push("--disable-blink-features=AutomationControlled".to_string());
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert(
                "goog:chromeOptions".to_string(),
                json!({
                    "args": args,
                    "excludeSwitches": ["enable-automation", "enable-logging"],
                    "useAutomationExtension": false,
                }),
            );
        }
        BrowserKind::Firefox => {
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({
                    "args": args,
                    "prefs": {
                        "general.useragent.override": user_agent,
                        "dom.webdriver.enabled": false,
                        "useAutomationExtension": false,
                    },
                }),
            );
        }
    }
    caps
}

/// A live WebDriver session.
#[derive(Debug, Clone)]
pub struct WebDriverBrowser {
    client: Client,
    kind: BrowserKind,
}

impl WebDriverBrowser {
    /// Start a new session against the WebDriver server at `webdriver_url`.
    #[instrument(level = "info", skip(webdriver_url))]
    pub async fn launch(kind: BrowserKind, webdriver_url: &str) -> Result<Self> {
        info!(%kind, %webdriver_url, "Starting browser session");

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(kind, USER_AGENT));
        let client = builder.connect(webdriver_url).await?;

        client.execute(HIDE_WEBDRIVER_JS, vec![]).await?;
        info!(%kind, "Browser session started");

        Ok(Self { client, kind })
    }
}

impl Browser for WebDriverBrowser {
    type Node = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(%url, "Navigating");
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn find(&self, scope: Option<&Element>, selector: &str) -> Result<Option<Element>> {
        Ok(self.find_all(scope, selector).await?.into_iter().next())
    }

    async fn find_all(&self, scope: Option<&Element>, selector: &str) -> Result<Vec<Element>> {
        let locator = Locator::Css(selector);
        let found = match scope {
            Some(parent) => parent.find_all(locator).await?,
            None => self.client.find_all(locator).await?,
        };
        if found.is_empty() {
            debug!(%selector, "Element not found");
        }
        Ok(found)
    }

    async fn click(&self, node: &Element) -> Result<()> {
        node.click().await?;
        Ok(())
    }

    async fn type_text(&self, node: &Element, text: &str) -> Result<()> {
        node.send_keys(text).await?;
        Ok(())
    }

    async fn property(&self, node: &Element, name: &str) -> Result<Option<String>> {
        Ok(node.prop(name).await?)
    }

    async fn outer_html(&self, node: &Element) -> Result<String> {
        Ok(node.html(false).await?)
    }

    async fn scroll_into_view(&self, node: &Element) -> Result<()> {
        let arg = serde_json::to_value(node)?;
        self.client.execute(SCROLL_INTO_VIEW_JS, vec![arg]).await?;
        Ok(())
    }

    async fn window_size(&self) -> Result<(u32, u32)> {
        let (width, height) = self.client.get_window_size().await?;
        Ok((width as u32, height as u32))
    }

    async fn viewport_size(&self) -> Result<(u32, u32)> {
        let value = self.client.execute(VIEWPORT_JS, vec![]).await?;
        let dims: Vec<u32> = serde_json::from_value(value)?;
        Ok((
            dims.first().copied().unwrap_or_default(),
            dims.get(1).copied().unwrap_or_default(),
        ))
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        self.client.set_window_size(width, height).await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    async fn quit(&self) -> Result<()> {
        info!(kind = %self.kind, "Closing browser session");
        self.client.clone().close().await?;
        Ok(())
    }
}
