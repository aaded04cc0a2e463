use log::{error, info, warn};
use reqwest::{header, Client, ClientBuilder, StatusCode};
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::ProductRecord;
use crate::ScraperResult;

pub const MANUAL_FILE: &str = "manual.pdf";
pub const IMAGE_FILE: &str = "img.jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: PathBuf, bytes: usize },
    Rejected { status: u16 },
}

/// Totals for the assets of one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub saved: usize,
    pub failed: usize,
    pub bytes: usize,
}

/// Fetches manuals and images over plain HTTP.
#[derive(Clone)]
pub struct AssetDownloader {
    client: Client,
}

impl AssetDownloader {
    pub fn new(user_agent: &str) -> ScraperResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/pdf,image/*,*/*;q=0.8"),
        );

        let client = ClientBuilder::new()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Writes the body of `url` to `dest` when the server answers 200.
    pub async fn download(&self, url: &str, dest: &Path) -> ScraperResult<DownloadOutcome> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok(DownloadOutcome::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &body)?;

        Ok(DownloadOutcome::Saved {
            path: dest.to_path_buf(),
            bytes: body.len(),
        })
    }

    /// Downloads the manual and image of `record` into `dir`, filling in the
    /// local paths of whatever arrived. Failures are logged, never returned.
    pub async fn fetch_assets(&self, record: &mut ProductRecord, dir: &Path) -> AssetReport {
        let mut report = AssetReport::default();

        let manual_url = record.manual_url.clone();
        record.manual_path = self
            .fetch_one("PDF", &manual_url, &dir.join(MANUAL_FILE), &mut report)
            .await;

        let image_url = record.image_url.clone();
        record.image_path = self
            .fetch_one("Image", &image_url, &dir.join(IMAGE_FILE), &mut report)
            .await;

        report
    }

    async fn fetch_one(
        &self,
        kind: &str,
        url: &str,
        dest: &Path,
        report: &mut AssetReport,
    ) -> Option<String> {
        if url.is_empty() {
            return None;
        }

        match self.download(url, dest).await {
            Ok(DownloadOutcome::Saved { path, bytes }) => {
                info!("{} downloaded successfully and saved at: {}", kind, path.display());
                report.saved += 1;
                report.bytes += bytes;
                Some(path.to_string_lossy().into_owned())
            }
            Ok(DownloadOutcome::Rejected { status }) => {
                error!("Failed to download {} from {}: status {}", kind, url, status);
                report.failed += 1;
                None
            }
            Err(e) => {
                warn!("Failed to download {} from {}: {}", kind, url, e);
                report.failed += 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Nameplate;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (AssetDownloader, MockServer, tempfile::TempDir) {
        let server = MockServer::start().await;
        let downloader = AssetDownloader::new("Mozilla/5.0").unwrap();
        let dir = tempfile::tempdir().unwrap();
        (downloader, server, dir)
    }

    fn record(manual_url: String, image_url: String) -> ProductRecord {
        ProductRecord {
            product_id: "CDP3310".into(),
            description: String::new(),
            specs: Nameplate::new(),
            bom: Vec::new(),
            image_url,
            manual_url,
            image_path: None,
            manual_path: None,
        }
    }

    #[tokio::test]
    async fn test_download_saves_body() {
        let (downloader, server, dir) = setup().await;

        Mock::given(method("GET"))
            .and(path("/manual"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let dest = dir.path().join("CDP3310").join(MANUAL_FILE);
        let outcome = downloader
            .download(&format!("{}/manual", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DownloadOutcome::Saved {
                path: dest.clone(),
                bytes: 8
            }
        );
        assert_eq!(fs::read(&dest).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_non_ok_status_leaves_no_file() {
        let (downloader, server, dir) = setup().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dest = dir.path().join("CDP3310").join(IMAGE_FILE);
        let outcome = downloader
            .download(&format!("{}/missing", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Rejected { status: 404 });
        assert!(!dest.exists());
        assert!(!dest.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_fetch_assets_records_paths() {
        let (downloader, server, dir) = setup().await;

        Mock::given(method("GET"))
            .and(path("/manual"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/image"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut record = record(
            format!("{}/manual", server.uri()),
            format!("{}/image", server.uri()),
        );
        let assets = dir.path().join("CDP3310");
        let report = downloader.fetch_assets(&mut record, &assets).await;

        assert_eq!(
            report,
            AssetReport {
                saved: 1,
                failed: 1,
                bytes: 3
            }
        );
        assert_eq!(
            record.manual_path.as_deref(),
            Some(assets.join(MANUAL_FILE).to_string_lossy().as_ref())
        );
        assert!(record.image_path.is_none());
        assert!(!assets.join(IMAGE_FILE).exists());
    }

    #[tokio::test]
    async fn test_fetch_assets_without_urls() {
        let (downloader, _server, dir) = setup().await;
        let mut record = record(String::new(), String::new());

        let assets = dir.path().join("CDP3310");
        let report = downloader.fetch_assets(&mut record, &assets).await;

        assert_eq!(report, AssetReport::default());
        assert!(!assets.exists());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_reported() {
        let (downloader, _server, dir) = setup().await;
        let mut record = record("http://127.0.0.1:1/manual".into(), String::new());

        let report = downloader.fetch_assets(&mut record, dir.path()).await;

        assert_eq!(report.failed, 1);
        assert!(record.manual_path.is_none());
    }
}
