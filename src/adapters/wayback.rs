//! HTTP access to the Wayback Machine: the CDX index for snapshot listings and
//! the replay endpoint for snapshot pages.

use crate::core::ConfigProvider;
use crate::domain::model::Snapshot;
use crate::utils::error::{ArchiveError, Result};
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;

pub const DEFAULT_CDX_ENDPOINT: &str = "http://web.archive.org/cdx/search/cdx";
pub const DEFAULT_WAYBACK_BASE: &str = "http://web.archive.org/web/";

#[derive(Debug, Clone)]
pub struct WaybackClient {
    client: Client,
    cdx_endpoint: String,
    wayback_base: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl WaybackClient {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("archivantage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            cdx_endpoint: config.cdx_endpoint().to_string(),
            wayback_base: config.wayback_base().to_string(),
            retry_attempts: config.retry_attempts().max(1),
            retry_delay: config.retry_delay(),
        })
    }

    pub fn wayback_base(&self) -> &str {
        &self.wayback_base
    }

    pub fn snapshot_url(&self, snapshot: &Snapshot) -> String {
        snapshot.wayback_url(&self.wayback_base)
    }

    /// Lists the captures of `url` made during `year`.
    ///
    /// Transport errors, 5xx and 429 responses are retried with a linear
    /// backoff of `retry_delay * attempt`.
    pub async fn list_snapshots(&self, url: &str, year: u16) -> Result<Vec<Snapshot>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.request_listing(url, year).await {
                Ok(snapshots) => {
                    tracing::info!("📡 Data fetched for the year {} ({} snapshots)", year, snapshots.len());
                    return Ok(snapshots);
                }
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    let delay = self.retry_delay * attempt;
                    tracing::warn!(
                        "CDX request for {} failed (attempt {}/{}): {}; retrying in {:?}",
                        year,
                        attempt,
                        self.retry_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Failed to fetch data for the year {} after {} attempt(s): {}",
                        year,
                        attempt,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn request_listing(&self, url: &str, year: u16) -> Result<Vec<Snapshot>> {
        let from = format!("{}0101", year);
        let to = format!("{}1231", year);

        tracing::debug!("Making CDX request to: {} (url={}, from={}, to={})", self.cdx_endpoint, url, from, to);
        let response = self
            .client
            .get(&self.cdx_endpoint)
            .query(&[
                ("url", url),
                ("output", "json"),
                ("fl", "timestamp,original"),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("CDX response status: {}", status);
        check_status(&self.cdx_endpoint, status)?;

        let body = response.text().await?;
        parse_cdx_rows(&body)
    }

    /// Fetches one snapshot page and returns its text content.
    pub async fn fetch_page_text(&self, snapshot: &Snapshot) -> Result<String> {
        let url = self.snapshot_url(snapshot);
        tracing::debug!("Fetching snapshot page: {}", url);

        let response = self.client.get(&url).send().await?;
        check_status(&url, response.status())?;

        let html = response.text().await?;
        Ok(extract_text(&html))
    }
}

fn check_status(url: &str, status: StatusCode) -> Result<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ArchiveError::RateLimited {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ArchiveError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// CDX JSON output is an array of rows whose first row is the field header.
pub fn parse_cdx_rows(body: &str) -> Result<Vec<Snapshot>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(body)?;
    let snapshots = rows
        .into_iter()
        .skip(1)
        .filter_map(|row| match (row.first(), row.get(1)) {
            (Some(serde_json::Value::String(ts)), Some(serde_json::Value::String(original))) => {
                Some(Snapshot::new(ts.as_str(), original.as_str()))
            }
            _ => {
                tracing::debug!("Skipping malformed CDX row: {:?}", row);
                None
            }
        })
        .collect();

    Ok(snapshots)
}

/// All text nodes of an HTML document, concatenated.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document.root_element().text().collect::<String>()
}
