use crate::adapters::WaybackClient;
use crate::domain::model::{KeywordMatches, Snapshot};

pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub matches: Vec<KeywordMatches>,
    pub interrupted: Option<String>,
}

/// Fetches each snapshot page once and tests every keyword against its text.
///
/// The first failed fetch ends the scan; whatever matched before it is kept.
pub async fn scan_snapshots(
    client: &WaybackClient,
    snapshots: &[Snapshot],
    keywords: &[String],
) -> ScanResult {
    let mut result = ScanResult {
        matches: keywords
            .iter()
            .map(|keyword| KeywordMatches {
                keyword: keyword.clone(),
                snapshots: Vec::new(),
            })
            .collect(),
        interrupted: None,
    };

    if keywords.is_empty() {
        return result;
    }

    for (index, snapshot) in snapshots.iter().enumerate() {
        let text = match client.fetch_page_text(snapshot).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Stopped searching after {}/{} snapshots: {} ({})",
                    index,
                    snapshots.len(),
                    e.user_friendly_message(),
                    e.recovery_suggestion()
                );
                result.interrupted = Some(e.to_string());
                break;
            }
        };

        for entry in result.matches.iter_mut() {
            if contains_keyword(&text, &entry.keyword) {
                entry.snapshots.push(snapshot.clone());
            }
        }
    }

    result
}
