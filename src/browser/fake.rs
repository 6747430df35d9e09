//! In-memory [`Browser`] over static HTML snapshots.
//!
//! Each snapshot is one "stage" of the page. Clicking a node whose selector
//! path mentions `show-more` advances to the next stage, which is how the
//! pagination loop is exercised without a real browser.
//!
//! Nodes are selector paths resolved against the current stage on every use,
//! so a container found before a stage change still sees the new children,
//! the same way a live DOM reference would.
//!
//! Clicking an `<option>` selects it: the `value` property of any `<select>`
//! then reports that option's value until another option is clicked.

use super::Browser;
use crate::error::{CrawlError, Result};
use scraper::{ElementRef, Html, Selector};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNode {
    path: Vec<(String, usize)>,
}

impl FakeNode {
    fn child(&self, selector: &str, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push((selector.to_string(), index));
        Self { path }
    }
}

#[derive(Debug)]
pub struct FakeBrowser {
    stages: Vec<String>,
    stage: Mutex<usize>,
    url: Mutex<String>,
    window: Mutex<(u32, u32)>,
    viewport: Mutex<(u32, u32)>,
    clicked: Mutex<Vec<String>>,
    typed: Mutex<Vec<String>>,
    scrolled: Mutex<usize>,
    selected: Mutex<Option<String>>,
    closed: Mutex<bool>,
}

impl FakeBrowser {
    pub fn new(stages: Vec<String>) -> Self {
        Self {
            stages,
            stage: Mutex::new(0),
            url: Mutex::new("about:blank".to_string()),
            window: Mutex::new((1024, 768)),
            viewport: Mutex::new((1024, 768)),
            clicked: Mutex::new(Vec::new()),
            typed: Mutex::new(Vec::new()),
            scrolled: Mutex::new(0),
            selected: Mutex::new(None),
            closed: Mutex::new(false),
        }
    }

    pub fn set_window_metrics(&self, window: (u32, u32), viewport: (u32, u32)) {
        *self.window.lock().unwrap() = window;
        *self.viewport.lock().unwrap() = viewport;
    }

    pub fn stage(&self) -> usize {
        *self.stage.lock().unwrap()
    }

    /// Last selector of every clicked node, in click order.
    pub fn clicked(&self) -> Vec<String> {
        self.clicked.lock().unwrap().clone()
    }

    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().unwrap().clone()
    }

    pub fn scrolled(&self) -> usize {
        *self.scrolled.lock().unwrap()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }

    fn document(&self) -> Html {
        Html::parse_document(&self.stages[self.stage()])
    }

    fn resolve<'a>(document: &'a Html, path: &[(String, usize)]) -> Result<Option<ElementRef<'a>>> {
        let mut current = document.root_element();
        for (selector, index) in path {
            let parsed = parse_selector(selector)?;
            match current.select(&parsed).nth(*index) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn require<'a>(document: &'a Html, node: &FakeNode) -> Result<ElementRef<'a>> {
        Self::resolve(document, &node.path)?
            .ok_or_else(|| CrawlError::ElementNotFound(format!("stale node {:?}", node.path)))
    }

    fn count(&self, scope: Option<&FakeNode>, selector: &str) -> Result<(FakeNode, usize)> {
        let base = scope.cloned().unwrap_or(FakeNode { path: Vec::new() });
        let document = self.document();
        let parsed = parse_selector(selector)?;
        let count = match Self::resolve(&document, &base.path)? {
            Some(element) => element.select(&parsed).count(),
            None => 0,
        };
        Ok((base, count))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|_| CrawlError::ElementNotFound(format!("invalid selector {selector}")))
}

impl Browser for FakeBrowser {
    type Node = FakeNode;

    async fn navigate(&self, url: &str) -> Result<()> {
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn find(&self, scope: Option<&FakeNode>, selector: &str) -> Result<Option<FakeNode>> {
        let (base, count) = self.count(scope, selector)?;
        Ok((count > 0).then(|| base.child(selector, 0)))
    }

    async fn find_all(&self, scope: Option<&FakeNode>, selector: &str) -> Result<Vec<FakeNode>> {
        let (base, count) = self.count(scope, selector)?;
        Ok((0..count).map(|i| base.child(selector, i)).collect())
    }

    async fn click(&self, node: &FakeNode) -> Result<()> {
        let document = self.document();
        let element = Self::require(&document, node)?;
        if element.value().name() == "option" {
            *self.selected.lock().unwrap() = element.value().attr("value").map(str::to_string);
        }

        if let Some((selector, _)) = node.path.last() {
            self.clicked.lock().unwrap().push(selector.clone());
        }
        if node.path.iter().any(|(selector, _)| selector.contains("show-more")) {
            let mut stage = self.stage.lock().unwrap();
            if *stage + 1 < self.stages.len() {
                *stage += 1;
            }
        }
        Ok(())
    }

    async fn type_text(&self, node: &FakeNode, text: &str) -> Result<()> {
        let document = self.document();
        Self::require(&document, node)?;
        self.typed.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn property(&self, node: &FakeNode, name: &str) -> Result<Option<String>> {
        let document = self.document();
        let element = Self::require(&document, node)?;
        if name == "value" && element.value().name() == "select" {
            if let Some(selected) = self.selected.lock().unwrap().clone() {
                return Ok(Some(selected));
            }
            let first = parse_selector("option")?;
            return Ok(element
                .select(&first)
                .next()
                .and_then(|option| option.value().attr("value"))
                .map(str::to_string));
        }
        Ok(element.value().attr(name).map(str::to_string))
    }

    async fn outer_html(&self, node: &FakeNode) -> Result<String> {
        let document = self.document();
        Ok(Self::require(&document, node)?.html())
    }

    async fn scroll_into_view(&self, node: &FakeNode) -> Result<()> {
        let document = self.document();
        Self::require(&document, node)?;
        *self.scrolled.lock().unwrap() += 1;
        Ok(())
    }

    async fn window_size(&self) -> Result<(u32, u32)> {
        Ok(*self.window.lock().unwrap())
    }

    async fn viewport_size(&self) -> Result<(u32, u32)> {
        Ok(*self.viewport.lock().unwrap())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        let mut window = self.window.lock().unwrap();
        let mut viewport = self.viewport.lock().unwrap();
        let (dw, dh) = (window.0 - viewport.0, window.1 - viewport.1);
        *window = (width, height);
        *viewport = (width - dw, height - dh);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn quit(&self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
