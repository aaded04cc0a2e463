use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use url::Url;

use crate::{ScraperError, ScraperResult};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    Exact(String),
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        match self {
            TextMatch::Exact(want) => text == want,
            TextMatch::Contains(want) => text.contains(want.as_str()),
        }
    }
}

/// Selects the element to click: the `index`th match of `selector` whose
/// text passes `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    pub selector: String,
    pub text: Option<TextMatch>,
    pub index: usize,
}

impl ClickTarget {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            text: None,
            index: 0,
        }
    }

    pub fn with_text(mut self, text: TextMatch) -> Self {
        self.text = Some(text);
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Position of the target among elements matching `selector`, given their texts.
    pub fn pick<'a, I>(&self, texts: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts
            .into_iter()
            .enumerate()
            .filter(|(_, text)| self.text.as_ref().map_or(true, |m| m.matches(text)))
            .nth(self.index)
            .map(|(position, _)| position)
    }

    /// In-page script clicking the target; evaluates to whether it was found.
    pub fn to_script(&self) -> String {
        let (mode, want) = match &self.text {
            Some(TextMatch::Exact(want)) => ("exact", Some(want.as_str())),
            Some(TextMatch::Contains(want)) => ("contains", Some(want.as_str())),
            None => ("any", None),
        };
        let selector = serde_json::Value::from(self.selector.as_str());
        let want = serde_json::Value::from(want);

        format!(
            r#"(() => {{
    const want = {want};
    const mode = "{mode}";
    const nodes = Array.from(document.querySelectorAll({selector})).filter((el) => {{
        const text = (el.textContent || "").trim();
        if (mode === "exact") return text === want;
        if (mode === "contains") return text.includes(want);
        return true;
    }});
    const el = nodes[{index}];
    if (!el) return false;
    el.click();
    return true;
}})()"#,
            index = self.index
        )
    }
}

/// One controlled browser tab, exclusively owned by a run.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn goto(&self, url: &Url) -> ScraperResult<()>;
    async fn current_url(&self) -> ScraperResult<Url>;
    async fn title(&self) -> ScraperResult<String>;
    /// Rendered HTML of the current page.
    async fn content(&self) -> ScraperResult<String>;
    async fn exists(&self, selector: &str) -> ScraperResult<bool>;
    async fn click(&self, target: &ClickTarget) -> ScraperResult<bool>;
    async fn close(&self) -> ScraperResult<()>;

    async fn wait_for(&self, selector: &str, timeout: Duration) -> ScraperResult<()> {
        let start = Instant::now();

        loop {
            if self.exists(selector).await? {
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(ScraperError::Timeout {
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis(),
                });
            }
            sleep(POLL_INTERVAL.min(timeout - elapsed)).await;
        }
    }
}

#[async_trait]
impl<T: BrowserSession + ?Sized> BrowserSession for Arc<T> {
    async fn goto(&self, url: &Url) -> ScraperResult<()> {
        (**self).goto(url).await
    }

    async fn current_url(&self) -> ScraperResult<Url> {
        (**self).current_url().await
    }

    async fn title(&self) -> ScraperResult<String> {
        (**self).title().await
    }

    async fn content(&self) -> ScraperResult<String> {
        (**self).content().await
    }

    async fn exists(&self, selector: &str) -> ScraperResult<bool> {
        (**self).exists(selector).await
    }

    async fn click(&self, target: &ClickTarget) -> ScraperResult<bool> {
        (**self).click(target).await
    }

    async fn close(&self) -> ScraperResult<()> {
        (**self).close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_match() {
        assert!(TextMatch::Exact("DC Motors".into()).matches("  DC Motors "));
        assert!(!TextMatch::Exact("DC Motors".into()).matches("DC Motors & Generators"));
        assert!(TextMatch::Contains("Allow All".into()).matches("Allow All Cookies"));
    }

    #[test]
    fn test_pick_filters_then_indexes() {
        let texts = ["AC Motors", "DC Motors", "Drives", "DC Motors"];

        let any = ClickTarget::new("div.ng-binding").nth(2);
        assert_eq!(any.pick(texts), Some(2));

        let exact = ClickTarget::new("div.ng-binding")
            .with_text(TextMatch::Exact("DC Motors".into()))
            .nth(1);
        assert_eq!(exact.pick(texts), Some(3));

        let missing = ClickTarget::new("div.ng-binding").nth(4);
        assert_eq!(missing.pick(texts), None);
    }

    #[test]
    fn test_script_escapes_arguments() {
        let script = ClickTarget::new(r#"div[data-x="1"]"#)
            .with_text(TextMatch::Contains("Allow \"All\"".into()))
            .to_script();

        assert!(script.contains(r#"querySelectorAll("div[data-x=\"1\"]")"#));
        assert!(script.contains(r#"const want = "Allow \"All\"";"#));
        assert!(script.contains(r#"const mode = "contains";"#));
        assert!(script.contains("nodes[0]"));
    }

    #[test]
    fn test_script_without_text() {
        let script = ClickTarget::new("a").nth(3).to_script();
        assert!(script.contains("const want = null;"));
        assert!(script.contains("nodes[3]"));
    }
}
