use crate::domain::model::{OutputFormat, SnapshotLink};
use crate::utils::error::{ArchiveError, Result};
use serde::Serialize;

pub fn render(format: OutputFormat, links: &[SnapshotLink]) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Text => Ok(render_text(links).into_bytes()),
        OutputFormat::Csv => render_csv(links),
        OutputFormat::Json => render_json(links),
        OutputFormat::Html => Ok(render_html(links).into_bytes()),
    }
}

pub fn render_text(links: &[SnapshotLink]) -> String {
    links
        .iter()
        .map(|link| format!("{}: {}\n", link.timestamp, link.wayback_url))
        .collect()
}

pub fn render_csv(links: &[SnapshotLink]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Timestamp", "Wayback URL"])?;
    for link in links {
        writer.write_record([link.timestamp.as_str(), link.wayback_url.as_str()])?;
    }
    writer.into_inner().map_err(|e| ArchiveError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

/// Pretty-printed with four-space indentation.
pub fn render_json(links: &[SnapshotLink]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    links.serialize(&mut serializer)?;
    Ok(buffer)
}

pub fn render_html(links: &[SnapshotLink]) -> String {
    let mut html = String::from("<html><body>\n<h1>Snapshot Links</h1>\n<ul>\n");
    for link in links {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&link.wayback_url),
            escape_html(&link.timestamp)
        ));
    }
    html.push_str("</ul>\n</body></html>\n");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
