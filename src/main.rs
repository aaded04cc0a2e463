use catalogscraper::{ChromiumSession, Crawler, ScrapeConfig, ScraperResult};

#[tokio::main]
async fn main() -> ScraperResult<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .filter_module("chromiumoxide", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = ScrapeConfig::default();
    let session = ChromiumSession::launch(&config).await?;

    let crawler = Crawler::new(Box::new(session), config)?;
    crawler.run().await?;

    Ok(())
}
