use log::{debug, error, info, warn};
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use crate::browser::{BrowserSession, ClickTarget, TextMatch};
use crate::core::config::{ScrapeConfig, FALLBACK_CATEGORY_INDEX};
use crate::http::AssetDownloader;
use crate::parser::listing::{CATEGORY_TILE, PRODUCT_LINK};
use crate::parser::{ListingParser, ProductLinks, ProductParser};
use crate::record::{ProductRecord, UNIDENTIFIED};
use crate::stats::StatsTracker;
use crate::storage::DiskStorage;
use crate::{ScraperError, ScraperResult};

pub const CONSENT_BUTTON: &str = "div.adroll_button_text";
pub const CONSENT_TEXT: &str = "Allow All";
pub const PRODUCT_TITLE: &str = "div.page-title";

/// Drives one sequential catalog run over a browser session.
pub struct Crawler {
    session: Box<dyn BrowserSession>,
    config: ScrapeConfig,
    listing: ListingParser,
    products: ProductParser,
    downloader: AssetDownloader,
    storage: DiskStorage,
    stats: StatsTracker,
}

impl Crawler {
    pub fn new(session: Box<dyn BrowserSession>, config: ScrapeConfig) -> ScraperResult<Self> {
        info!("Initializing crawler for {}", config.catalog_url);

        Ok(Self {
            listing: ListingParser::new()?,
            products: ProductParser::new(config.nameplate_keys.clone())?,
            downloader: AssetDownloader::new(&config.user_agent)?,
            storage: DiskStorage::new(&config.output_dir)?,
            stats: StatsTracker::new(),
            session,
            config,
        })
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Scrapes up to the configured number of products, then closes the session.
    pub async fn run(&self) -> ScraperResult<Vec<ProductRecord>> {
        let result = self.scrape().await;

        if let Err(e) = self.session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        self.stats.finish();
        self.stats.print_summary();

        result
    }

    async fn scrape(&self) -> ScraperResult<Vec<ProductRecord>> {
        self.open().await?;
        if !self.load_products_page().await? {
            warn!("No category page opened; nothing to scrape");
            return Ok(Vec::new());
        }

        let links = self.walk_listing().await?;
        let mut records = Vec::new();
        for url in links {
            records.push(self.scrape_product(&url).await?);
            self.pause().await;
        }

        info!("Run completed with {} records", records.len());
        Ok(records)
    }

    /// Loads the catalog root and clears the consent overlay.
    pub async fn open(&self) -> ScraperResult<()> {
        info!("Opening catalog {}", self.config.catalog_url);
        self.session.goto(&self.config.catalog_url).await?;
        self.handle_consent_popup().await
    }

    pub async fn handle_consent_popup(&self) -> ScraperResult<()> {
        match self
            .session
            .wait_for(CONSENT_BUTTON, self.config.wait_timeout)
            .await
        {
            Ok(()) => {}
            Err(ScraperError::Timeout { .. }) => {
                warn!("No consent popup detected");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let button =
            ClickTarget::new(CONSENT_BUTTON).with_text(TextMatch::Contains(CONSENT_TEXT.into()));
        if self.session.click(&button).await? {
            info!("Clicked on '{}' cookie banner", CONSENT_TEXT);
            sleep(self.config.consent_settle).await;
        } else {
            warn!("Consent popup present but no '{}' button", CONSENT_TEXT);
        }
        Ok(())
    }

    /// Opens the configured category, or the fallback tile when none is set.
    ///
    /// Returns whether a tile was clicked. A missing category, a missing
    /// fallback tile, or tiles that never load are logged and end the run
    /// without records.
    pub async fn load_products_page(&self) -> ScraperResult<bool> {
        match self
            .session
            .wait_for(CATEGORY_TILE, self.config.wait_timeout)
            .await
        {
            Ok(()) => {}
            Err(ScraperError::Timeout { .. }) => {
                error!("Timeout: category tiles did not load in time");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        let names = self.listing.category_names(&self.session.content().await?);
        info!("Found {} categories of products on online catalog", names.len());
        debug!("Categories: {:?}", names);
        self.pause().await;

        let tile = ClickTarget::new(CATEGORY_TILE);
        let clicked = match &self.config.target_category {
            Some(category) => {
                let target = tile.with_text(TextMatch::Exact(category.clone()));
                let clicked = self.session.click(&target).await?;
                if !clicked {
                    warn!("Category '{}' not found on catalog", category);
                }
                clicked
            }
            None => {
                let clicked = self
                    .session
                    .click(&tile.nth(FALLBACK_CATEGORY_INDEX))
                    .await?;
                if !clicked {
                    error!(
                        "No category tile at position {} ({} tiles)",
                        FALLBACK_CATEGORY_INDEX,
                        names.len()
                    );
                }
                clicked
            }
        };

        if clicked {
            self.pause().await;
            info!(
                "Successfully loaded products page: {}",
                self.session.title().await?
            );
        }
        Ok(clicked)
    }

    /// Collects product detail links from the page currently loaded.
    pub async fn walk_listing(&self) -> ScraperResult<ProductLinks> {
        match self
            .session
            .wait_for(PRODUCT_LINK, self.config.wait_timeout)
            .await
        {
            Ok(()) => {}
            Err(ScraperError::Timeout { .. }) => {
                warn!("No product links found on category page");
                return Ok(ProductLinks::empty());
            }
            Err(e) => return Err(e),
        }

        let html = self.session.content().await?;
        let page_url = self.session.current_url().await?;
        let links = self.listing.product_links(
            &html,
            &page_url,
            self.config.listing_skip,
            self.config.product_limit,
        );

        info!(
            "Scraping {} of {} products from {}",
            links.len(),
            links.found(),
            page_url
        );
        self.stats.record_listing(links.found(), links.len());
        Ok(links)
    }

    /// Extracts one product, downloads its assets and writes its record.
    pub async fn scrape_product(&self, url: &Url) -> ScraperResult<ProductRecord> {
        self.session.goto(url).await?;
        if let Err(e) = self
            .session
            .wait_for(PRODUCT_TITLE, self.config.wait_timeout)
            .await
        {
            match e {
                ScraperError::Timeout { .. } => warn!("Product title did not appear on {}", url),
                other => return Err(other),
            }
        }
        info!(
            "Successfully loaded product detail page: {}",
            self.session.title().await?
        );

        let html = self.session.content().await?;
        let page_url = self.session.current_url().await?;
        let mut record = self.products.parse(&html, &page_url);

        let asset_dir = self.storage.asset_dir(&record);
        let report = self.downloader.fetch_assets(&mut record, &asset_dir).await;
        self.stats.record_assets(&report);

        self.storage.store(&record)?;
        self.stats.record_written(record.product_id == UNIDENTIFIED);

        Ok(record)
    }

    /// Random human-like pause between page interactions.
    async fn pause(&self) {
        let range = &self.config.pause_secs;
        let secs = if range.start() < range.end() {
            rand::thread_rng().gen_range(range.clone())
        } else {
            *range.start()
        };
        if secs > 0.0 {
            sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}
