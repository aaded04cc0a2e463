use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::env;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

use super::session::{BrowserSession, ClickTarget};
use super::stealth::{EVASION_SCRIPTS, LAUNCH_ARGS};
use crate::core::ScrapeConfig;
use crate::{ScraperError, ScraperResult};

const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
];

const CHROME_BINARIES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Browser binary from `CHROME_PATH`, the usual install locations, or `PATH`.
pub fn find_chrome() -> Option<PathBuf> {
    if let Some(path) = env::var_os("CHROME_PATH").map(PathBuf::from) {
        if path.exists() {
            return Some(path);
        }
        warn!("CHROME_PATH points at a missing file: {}", path.display());
    }

    if let Some(path) = CHROME_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
    {
        return Some(path);
    }

    let search = env::var_os("PATH")?;
    env::split_paths(&search).find_map(|dir| {
        CHROME_BINARIES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// A single Chromium tab driven over CDP.
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    pub async fn launch(config: &ScrapeConfig) -> ScraperResult<Self> {
        let chrome = find_chrome().ok_or_else(|| {
            ScraperError::LaunchError(
                "Chrome/Chromium not found; install it or set CHROME_PATH".to_string(),
            )
        })?;
        info!(
            "Launching browser {} (headless={})",
            chrome.display(),
            config.headless
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .window_size(1920, 1080)
            .args(LAUNCH_ARGS.iter().copied());
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(ScraperError::LaunchError)?;

        let (browser, mut events) = Browser::launch(browser_config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await?;
        for script in EVASION_SCRIPTS {
            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(*script))
                .await?;
        }

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> ScraperResult<T> {
        self.page
            .evaluate(script)
            .await?
            .into_value()
            .map_err(|e| ScraperError::ExtractionError(format!("unexpected script result: {e:?}")))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &Url) -> ScraperResult<()> {
        debug!("Navigating to {}", url);
        self.page.goto(url.as_str()).await?;
        Ok(())
    }

    async fn current_url(&self) -> ScraperResult<Url> {
        let url = self
            .page
            .url()
            .await?
            .ok_or_else(|| ScraperError::NavigationError("page has no URL".to_string()))?;
        Ok(Url::parse(&url)?)
    }

    async fn title(&self) -> ScraperResult<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn content(&self) -> ScraperResult<String> {
        Ok(self.page.content().await?)
    }

    async fn exists(&self, selector: &str) -> ScraperResult<bool> {
        let selector = serde_json::Value::from(selector);
        self.evaluate(format!("document.querySelector({selector}) !== null"))
            .await
    }

    async fn click(&self, target: &ClickTarget) -> ScraperResult<bool> {
        self.evaluate(target.to_script()).await
    }

    async fn close(&self) -> ScraperResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        if let Err(e) = browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        info!("Browser closed");
        Ok(())
    }
}
