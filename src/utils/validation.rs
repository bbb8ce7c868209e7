use crate::domain::model::OutputFormat;
use crate::utils::error::{ArchiveError, Result};
use url::{Host, Url};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 目標網址：http/https，且主機必須是 localhost、IP 或含有點的網域
pub fn validate_target_url(field_name: &str, url_str: &str) -> Result<()> {
    let url_str = url_str.trim();
    if url_str.is_empty() {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    let url = Url::parse(url_str).map_err(|e| ArchiveError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ArchiveError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            })
        }
    }

    let host_ok = match url.host() {
        Some(Host::Domain(domain)) => {
            domain.eq_ignore_ascii_case("localhost")
                || domain
                    .trim_end_matches('.')
                    .split('.')
                    .filter(|label| !label.is_empty())
                    .count()
                    >= 2
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    };

    if !host_ok {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "Host must be a domain name, localhost or an IP address".to_string(),
        });
    }

    Ok(())
}

pub fn parse_years(raw: &str) -> Result<Vec<u16>> {
    let mut years = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let year = if entry.len() == 4 && entry.bytes().all(|b| b.is_ascii_digit()) {
            entry.parse::<u16>().ok().filter(|y| *y >= 1000)
        } else {
            None
        };
        match year {
            Some(year) if !years.contains(&year) => years.push(year),
            Some(_) => {}
            None => tracing::warn!("Ignoring invalid year '{}'", entry),
        }
    }

    if years.is_empty() {
        return Err(ArchiveError::ValidationError {
            message: format!(
                "'{}' contains no valid years; use a comma-separated list such as 2004,2008",
                raw
            ),
        });
    }
    Ok(years)
}

/// 空白的關鍵字會被捨棄，空結果代表不做關鍵字搜尋
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

pub fn parse_output_formats(raw: &str) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.parse::<OutputFormat>() {
            Ok(format) if !formats.contains(&format) => formats.push(format),
            Ok(_) => {}
            Err(_) => tracing::warn!("Ignoring unsupported output format '{}'", entry),
        }
    }

    if formats.is_empty() {
        return Err(ArchiveError::ValidationError {
            message: format!(
                "'{}' contains no valid output formats; choose from {}",
                raw,
                OutputFormat::names().join(", ")
            ),
        });
    }
    Ok(formats)
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_endpoint(field_name: &str, url_str: &str) -> Result<()> {
    match Url::parse(url_str) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Unsupported URL scheme: {}", url.scheme()),
        }),
        Err(e) => Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
