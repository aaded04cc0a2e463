use async_trait::async_trait;
use parking_lot::Mutex;
use scraper::Html;
use std::collections::HashMap;
use url::Url;

use super::session::{BrowserSession, ClickTarget};
use crate::parser::product::{selector, stripped_text};
use crate::{ScraperError, ScraperResult};

/// A canned page served by [`MockSession`].
#[derive(Debug, Clone)]
pub struct MockPage {
    pub title: String,
    pub html: String,
    transitions: Vec<(ClickTarget, Url)>,
}

impl MockPage {
    pub fn new(title: &str, html: &str) -> Self {
        Self {
            title: title.to_string(),
            html: html.to_string(),
            transitions: Vec::new(),
        }
    }

    /// Clicking `target` on this page navigates to `destination`.
    pub fn on_click(mut self, target: ClickTarget, destination: Url) -> Self {
        self.transitions.push((target, destination));
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current: Option<Url>,
    visited: Vec<Url>,
    clicks: Vec<ClickTarget>,
    closed: bool,
}

/// Scripted browser session backed by static HTML.
#[derive(Debug, Default)]
pub struct MockSession {
    pages: HashMap<String, MockPage>,
    state: Mutex<MockState>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &Url, page: MockPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn visited(&self) -> Vec<Url> {
        self.state.lock().visited.clone()
    }

    pub fn clicks(&self) -> Vec<ClickTarget> {
        self.state.lock().clicks.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn current_page(&self) -> ScraperResult<(Url, &MockPage)> {
        let current = self
            .state
            .lock()
            .current
            .clone()
            .ok_or_else(|| ScraperError::NavigationError("no page loaded".to_string()))?;
        let page = self.page(&current)?;
        Ok((current, page))
    }

    fn page(&self, url: &Url) -> ScraperResult<&MockPage> {
        self.pages
            .get(url.as_str())
            .ok_or_else(|| ScraperError::NavigationError(format!("no mock page for {url}")))
    }

    fn navigate(&self, url: &Url) -> ScraperResult<()> {
        self.page(url)?;
        let mut state = self.state.lock();
        state.current = Some(url.clone());
        state.visited.push(url.clone());
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn goto(&self, url: &Url) -> ScraperResult<()> {
        self.navigate(url)
    }

    async fn current_url(&self) -> ScraperResult<Url> {
        Ok(self.current_page()?.0)
    }

    async fn title(&self) -> ScraperResult<String> {
        Ok(self.current_page()?.1.title.clone())
    }

    async fn content(&self) -> ScraperResult<String> {
        Ok(self.current_page()?.1.html.clone())
    }

    async fn exists(&self, css: &str) -> ScraperResult<bool> {
        let (_, page) = self.current_page()?;
        let selector = selector(css)?;
        let found = Html::parse_document(&page.html)
            .select(&selector)
            .next()
            .is_some();
        Ok(found)
    }

    async fn click(&self, target: &ClickTarget) -> ScraperResult<bool> {
        let (_, page) = self.current_page()?;
        let selector = selector(&target.selector)?;
        let texts: Vec<String> = Html::parse_document(&page.html)
            .select(&selector)
            .map(stripped_text)
            .collect();

        if target.pick(texts.iter().map(String::as_str)).is_none() {
            return Ok(false);
        }
        self.state.lock().clicks.push(target.clone());

        let destination = page
            .transitions
            .iter()
            .find(|(registered, _)| registered == target)
            .map(|(_, destination)| destination.clone());
        if let Some(destination) = destination {
            self.navigate(&destination)?;
        }
        Ok(true)
    }

    async fn close(&self) -> ScraperResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::session::TextMatch;
    use std::time::Duration;

    fn url(path: &str) -> Url {
        Url::parse("https://catalog.test/").unwrap().join(path).unwrap()
    }

    fn session() -> MockSession {
        let consent = ClickTarget::new("div.button").with_text(TextMatch::Contains("Allow".into()));
        MockSession::new()
            .with_page(
                &url("/home"),
                MockPage::new("Home", r#"<div class="button">Allow All</div>"#)
                    .on_click(consent, url("/next")),
            )
            .with_page(&url("/next"), MockPage::new("Next", "<p>next</p>"))
    }

    #[tokio::test]
    async fn test_click_follows_transition() {
        let session = session();
        session.goto(&url("/home")).await.unwrap();

        let target = ClickTarget::new("div.button").with_text(TextMatch::Contains("Allow".into()));
        assert!(session.click(&target).await.unwrap());
        assert_eq!(session.current_url().await.unwrap(), url("/next"));
        assert_eq!(session.title().await.unwrap(), "Next");
        assert_eq!(session.clicks(), vec![target]);
    }

    #[tokio::test]
    async fn test_click_missing_element() {
        let session = session();
        session.goto(&url("/next")).await.unwrap();

        assert!(!session.click(&ClickTarget::new("div.button")).await.unwrap());
        assert!(session.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_page_is_navigation_error() {
        let session = session();
        let result = session.goto(&url("/missing")).await;
        assert!(matches!(result, Err(ScraperError::NavigationError(_))));
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let session = session();
        session.goto(&url("/next")).await.unwrap();

        session
            .wait_for("p", Duration::from_millis(10))
            .await
            .unwrap();
        let result = session
            .wait_for("table.nameplate", Duration::from_millis(30))
            .await;
        assert!(matches!(result, Err(ScraperError::Timeout { .. })));
    }
}
