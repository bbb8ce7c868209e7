use crate::adapters::WaybackClient;
use crate::core::render::render;
use crate::core::search::scan_snapshots;
use crate::core::{ConfigProvider, Pipeline, Snapshot, Storage, YearReport};
use crate::domain::model::{keyword_dir, SearchRequest};
use crate::utils::error::Result;

pub struct ArchivePipeline<S: Storage> {
    storage: S,
    request: SearchRequest,
    client: WaybackClient,
}

impl<S: Storage> ArchivePipeline<S> {
    pub fn new<C: ConfigProvider>(storage: S, config: &C, request: SearchRequest) -> Result<Self> {
        let client = WaybackClient::from_config(config)?;
        Ok(Self {
            storage,
            request,
            client,
        })
    }

    /// 以所有選定格式寫出一份清單，回傳寫入的檔案路徑
    async fn write_listing(&self, directory: &str, year: u16, snapshots: &[Snapshot]) -> Result<Vec<String>> {
        let links: Vec<_> = snapshots
            .iter()
            .map(|s| s.to_link(self.client.wayback_base()))
            .collect();
        let stem = self.request.listing_stem(year);

        let mut written = Vec::with_capacity(self.request.formats.len());
        for format in &self.request.formats {
            let path = format!("{}/{}.{}", directory, stem, format.extension());
            let data = render(*format, &links)?;
            self.storage.write_file(&path, &data).await?;

            let location = self.storage.display_path(&path);
            tracing::info!("💾 Snapshot links saved to {}", location);
            println!("Snapshot links saved to {}", location);
            written.push(location);
        }
        Ok(written)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ArchivePipeline<S> {
    async fn extract(&self, year: u16) -> Result<Vec<Snapshot>> {
        self.client.list_snapshots(&self.request.url, year).await
    }

    async fn transform(&self, year: u16, snapshots: Vec<Snapshot>) -> Result<YearReport> {
        if snapshots.is_empty() || self.request.keywords.is_empty() {
            return Ok(YearReport {
                year,
                snapshots,
                ..Default::default()
            });
        }

        tracing::info!(
            "🔎 Searching {} snapshots from {} for {} keyword(s)",
            snapshots.len(),
            year,
            self.request.keywords.len()
        );
        let scan = scan_snapshots(&self.client, &snapshots, &self.request.keywords).await;

        Ok(YearReport {
            year,
            snapshots,
            keyword_matches: scan.matches,
            scan_interrupted: scan.interrupted,
        })
    }

    async fn load(&self, report: YearReport) -> Result<Vec<String>> {
        let year = report.year;
        if report.snapshots.is_empty() {
            tracing::info!("No snapshots found for the year {}.", year);
            println!("No snapshots found for the year {}.", year);
            return Ok(Vec::new());
        }

        let year_dir = year.to_string();
        let mut written = Vec::new();

        if self.request.keywords.is_empty() {
            written.extend(self.write_listing(&year_dir, year, &report.snapshots).await?);
            return Ok(written);
        }

        // 沒有任何命中的關鍵字會改寫出整年清單，但每年只寫一次
        let mut year_listing_written = false;
        for entry in &report.keyword_matches {
            if entry.snapshots.is_empty() {
                tracing::info!("No snapshots contained the keyword '{}' for year {}.", entry.keyword, year);
                println!("No snapshots contained the keyword '{}' for year {}.", entry.keyword, year);
                if !year_listing_written {
                    written.extend(self.write_listing(&year_dir, year, &report.snapshots).await?);
                    year_listing_written = true;
                }
                continue;
            }

            let directory = format!("{}/{}", year_dir, keyword_dir(&entry.keyword));
            written.extend(self.write_listing(&directory, year, &entry.snapshots).await?);
            tracing::info!("Keyword '{}' found and saved in snapshots for year {}.", entry.keyword, year);
            println!("Keyword '{}' found and saved in snapshots for year {}.", entry.keyword, year);
        }

        if let Some(reason) = &report.scan_interrupted {
            tracing::warn!("⚠️ Keyword results for {} are partial: {}", year, reason);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{KeywordMatches, OutputFormat};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn paths(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut paths: Vec<String> = files.keys().cloned().collect();
            paths.sort();
            paths
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn display_path(&self, path: &str) -> String {
            path.to_string()
        }
    }

    struct MockConfig {
        cdx_endpoint: String,
        wayback_base: String,
    }

    impl MockConfig {
        fn new(server: &MockServer) -> Self {
            Self {
                cdx_endpoint: server.url("/cdx/search/cdx"),
                wayback_base: server.url("/web/"),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn cdx_endpoint(&self) -> &str {
            &self.cdx_endpoint
        }

        fn wayback_base(&self) -> &str {
            &self.wayback_base
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn concurrent_requests(&self) -> usize {
            2
        }

        fn retry_attempts(&self) -> u32 {
            1
        }

        fn retry_delay(&self) -> Duration {
            Duration::from_millis(1)
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn request(keywords: &[&str], formats: Vec<OutputFormat>) -> SearchRequest {
        SearchRequest {
            url: "http://example.com".to_string(),
            years: vec![2008],
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            formats,
        }
    }

    fn snapshots() -> Vec<Snapshot> {
        vec![
            Snapshot::new("20080115123045", "http://example.com/"),
            Snapshot::new("20080601000000", "http://example.com/"),
        ]
    }

    #[tokio::test]
    async fn test_extract_lists_year_snapshots() {
        let server = MockServer::start();
        let cdx_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cdx/search/cdx")
                .query_param("from", "20080101");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    ["timestamp", "original"],
                    ["20080115123045", "http://example.com/"],
                    ["20080601000000", "http://example.com/"]
                ]));
        });

        let pipeline = ArchivePipeline::new(
            MockStorage::new(),
            &MockConfig::new(&server),
            request(&[], vec![OutputFormat::Text]),
        )
        .unwrap();

        let result = pipeline.extract(2008).await.unwrap();

        cdx_mock.assert();
        assert_eq!(result, snapshots());
    }

    #[tokio::test]
    async fn test_transform_filters_by_keyword() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path_contains("20080115123045");
            then.status(200)
                .body("<html><body><h1>Learning RUST today</h1></body></html>");
        });
        let second = server.mock(|when, then| {
            when.method(GET).path_contains("20080601000000");
            then.status(200)
                .body("<html><body><p>Nothing to see here, only python</p></body></html>");
        });

        let pipeline = ArchivePipeline::new(
            MockStorage::new(),
            &MockConfig::new(&server),
            request(&["rust", "python", "golang"], vec![OutputFormat::Text]),
        )
        .unwrap();

        let report = pipeline.transform(2008, snapshots()).await.unwrap();

        // 每個頁面只抓一次
        first.assert_hits(1);
        second.assert_hits(1);
        assert_eq!(report.keyword_matches.len(), 3);
        assert_eq!(report.keyword_matches[0].snapshots, vec![snapshots()[0].clone()]);
        assert_eq!(report.keyword_matches[1].snapshots, vec![snapshots()[1].clone()]);
        assert!(report.keyword_matches[2].snapshots.is_empty());
        assert!(report.scan_interrupted.is_none());
    }

    #[tokio::test]
    async fn test_transform_stops_on_fetch_error_and_keeps_partial_matches() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_contains("20080115123045");
            then.status(200).body("<p>rust</p>");
        });
        server.mock(|when, then| {
            when.method(GET).path_contains("20080601000000");
            then.status(429);
        });

        let pipeline = ArchivePipeline::new(
            MockStorage::new(),
            &MockConfig::new(&server),
            request(&["rust"], vec![OutputFormat::Text]),
        )
        .unwrap();

        let mut input = snapshots();
        input.push(Snapshot::new("20081201000000", "http://example.com/"));
        let report = pipeline.transform(2008, input).await.unwrap();

        assert_eq!(report.keyword_matches[0].snapshots.len(), 1);
        assert!(report.scan_interrupted.unwrap().contains("Rate limit"));
    }

    #[tokio::test]
    async fn test_transform_without_keywords_skips_page_fetches() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path_contains("/web/");
            then.status(200).body("<p>rust</p>");
        });

        let pipeline = ArchivePipeline::new(
            MockStorage::new(),
            &MockConfig::new(&server),
            request(&[], vec![OutputFormat::Text]),
        )
        .unwrap();

        let report = pipeline.transform(2008, snapshots()).await.unwrap();

        page_mock.assert_hits(0);
        assert!(report.keyword_matches.is_empty());
        assert_eq!(report.snapshots.len(), 2);
    }

    #[tokio::test]
    async fn test_load_year_listing_in_every_format() {
        let storage = MockStorage::new();
        let config = MockConfig {
            cdx_endpoint: "http://test.com/cdx".to_string(),
            wayback_base: "http://web.archive.org/web/".to_string(),
        };
        let pipeline = ArchivePipeline::new(storage.clone(), &config, request(&[], OutputFormat::ALL.to_vec())).unwrap();

        let report = YearReport {
            year: 2008,
            snapshots: snapshots(),
            ..Default::default()
        };
        let written = pipeline.load(report).await.unwrap();

        assert_eq!(written.len(), 4);
        assert_eq!(
            storage.paths().await,
            vec![
                "2008/example.com_2008_snapshots.csv",
                "2008/example.com_2008_snapshots.html",
                "2008/example.com_2008_snapshots.json",
                "2008/example.com_2008_snapshots.txt",
            ]
        );

        let text = storage.get_file("2008/example.com_2008_snapshots.txt").await.unwrap();
        assert_eq!(
            String::from_utf8(text).unwrap(),
            "2008-01-15 12:30:45: http://web.archive.org/web/20080115123045/http://example.com/\n\
             2008-06-01 00:00:00: http://web.archive.org/web/20080601000000/http://example.com/\n"
        );
    }

    #[tokio::test]
    async fn test_load_keyword_listings_and_fallback() {
        let storage = MockStorage::new();
        let config = MockConfig {
            cdx_endpoint: "http://test.com/cdx".to_string(),
            wayback_base: "http://web.archive.org/web/".to_string(),
        };
        let pipeline = ArchivePipeline::new(
            storage.clone(),
            &config,
            request(&["open source", "golang", "cobol"], vec![OutputFormat::Json]),
        )
        .unwrap();

        let report = YearReport {
            year: 2008,
            snapshots: snapshots(),
            keyword_matches: vec![
                KeywordMatches {
                    keyword: "open source".to_string(),
                    snapshots: vec![snapshots()[1].clone()],
                },
                KeywordMatches {
                    keyword: "golang".to_string(),
                    snapshots: vec![],
                },
                KeywordMatches {
                    keyword: "cobol".to_string(),
                    snapshots: vec![],
                },
            ],
            scan_interrupted: None,
        };
        let written = pipeline.load(report).await.unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            storage.paths().await,
            vec![
                "2008/example.com_2008_snapshots.json",
                "2008/open_source/example.com_2008_snapshots.json",
            ]
        );

        let json = storage
            .get_file("2008/open_source/example.com_2008_snapshots.json")
            .await
            .unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["timestamp"], "2008-06-01 00:00:00");
    }

    #[tokio::test]
    async fn test_load_dot_keywords_stay_below_year_directory() {
        let storage = MockStorage::new();
        let config = MockConfig {
            cdx_endpoint: "http://test.com/cdx".to_string(),
            wayback_base: "http://web.archive.org/web/".to_string(),
        };
        let pipeline = ArchivePipeline::new(
            storage.clone(),
            &config,
            request(&["golang", ".", ".."], vec![OutputFormat::Text]),
        )
        .unwrap();

        let report = YearReport {
            year: 2008,
            snapshots: snapshots(),
            keyword_matches: vec![
                KeywordMatches {
                    keyword: "golang".to_string(),
                    snapshots: vec![],
                },
                KeywordMatches {
                    keyword: ".".to_string(),
                    snapshots: vec![snapshots()[0].clone()],
                },
                KeywordMatches {
                    keyword: "..".to_string(),
                    snapshots: vec![snapshots()[1].clone()],
                },
            ],
            scan_interrupted: None,
        };
        let written = pipeline.load(report).await.unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(
            storage.paths().await,
            vec![
                "2008/_/example.com_2008_snapshots.txt",
                "2008/__/example.com_2008_snapshots.txt",
                "2008/example.com_2008_snapshots.txt",
            ]
        );

        // 整年清單不可被關鍵字清單覆蓋
        let year_listing = storage.get_file("2008/example.com_2008_snapshots.txt").await.unwrap();
        assert_eq!(String::from_utf8(year_listing).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_load_without_snapshots_writes_nothing() {
        let storage = MockStorage::new();
        let config = MockConfig {
            cdx_endpoint: "http://test.com/cdx".to_string(),
            wayback_base: "http://web.archive.org/web/".to_string(),
        };
        let pipeline = ArchivePipeline::new(storage.clone(), &config, request(&["rust"], vec![OutputFormat::Csv])).unwrap();

        let written = pipeline
            .load(YearReport {
                year: 2008,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(written.is_empty());
        assert!(storage.paths().await.is_empty());
    }
}
