use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Text,
        OutputFormat::Csv,
        OutputFormat::Json,
        OutputFormat::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.as_str()).collect()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lowered)
            .ok_or_else(|| format!("unsupported output format: {}", s))
    }
}

/// One row of a CDX listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// `YYYYMMDDhhmmss`
    pub timestamp: String,
    pub original: String,
}

impl Snapshot {
    pub fn new(timestamp: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            original: original.into(),
        }
    }

    /// Replay URL under `wayback_base`; an `original` that already points into
    /// the archive is not prefixed twice.
    pub fn wayback_url(&self, wayback_base: &str) -> String {
        let original = self
            .original
            .strip_prefix(wayback_base)
            .unwrap_or(&self.original);
        format!("{}{}/{}", wayback_base, self.timestamp, original)
    }

    pub fn human_timestamp(&self) -> String {
        format_timestamp(&self.timestamp)
    }

    pub fn to_link(&self, wayback_base: &str) -> SnapshotLink {
        SnapshotLink {
            timestamp: self.human_timestamp(),
            wayback_url: self.wayback_url(wayback_base),
        }
    }
}

/// `20080115123045` -> `2008-01-15 12:30:45`; anything unparsable is returned as-is.
pub fn format_timestamp(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, "%Y%m%d%H%M%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLink {
    pub timestamp: String,
    pub wayback_url: String,
}

/// 已驗證的使用者輸入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub url: String,
    pub years: Vec<u16>,
    pub keywords: Vec<String>,
    pub formats: Vec<OutputFormat>,
}

impl SearchRequest {
    fn without_scheme(&self) -> &str {
        let url = self.url.as_str();
        url.strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url)
    }

    /// Directory the whole run writes into, e.g. `example_com_blog`.
    pub fn site_dir(&self) -> String {
        self.without_scheme().replace(['/', '.'], "_")
    }

    /// File name (without extension) for the listing of one year.
    pub fn listing_stem(&self, year: u16) -> String {
        format!("{}_{}_snapshots", self.without_scheme().replace('/', "_"), year)
    }
}

/// Directory name for one keyword's listing, always a single path component
/// below the year directory.
pub fn keyword_dir(keyword: &str) -> String {
    let name = keyword.replace([' ', '/', '\\'], "_");
    // "", "." and ".." would resolve to the year directory or its parent
    if name.chars().all(|c| c == '.') {
        return "_".repeat(name.len().max(1));
    }
    name
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatches {
    pub keyword: String,
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct YearReport {
    pub year: u16,
    pub snapshots: Vec<Snapshot>,
    pub keyword_matches: Vec<KeywordMatches>,
    /// Set when the keyword scan stopped early because a page could not be fetched.
    pub scan_interrupted: Option<String>,
}

#[derive(Debug, Clone)]
pub enum YearStatus {
    Written { files: Vec<String> },
    NoSnapshots,
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct YearOutcome {
    pub year: u16,
    pub status: YearStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<YearOutcome>,
}

impl RunSummary {
    pub fn files_written(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                YearStatus::Written { files } => files.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn failed_years(&self) -> Vec<u16> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, YearStatus::Failed { .. }))
            .map(|o| o.year)
            .collect()
    }
}
