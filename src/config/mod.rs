pub mod prompt;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{ArchiveError, Result};
use crate::utils::validation::{validate_endpoint, validate_path, validate_positive_number, validate_range};

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

pub const DEFAULT_OUTPUT_PATH: &str = ".";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 4;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 1;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "archivantage.log";

/// Checks the connection and output settings shared by every config source.
pub fn validate_settings<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_endpoint("cdx_endpoint", config.cdx_endpoint())?;
    validate_endpoint("wayback_base", config.wayback_base())?;
    if !config.wayback_base().ends_with('/') {
        return Err(ArchiveError::InvalidConfigValueError {
            field: "wayback_base".to_string(),
            value: config.wayback_base().to_string(),
            reason: "Must end with '/'".to_string(),
        });
    }
    validate_path("output_path", config.output_path())?;
    validate_positive_number("concurrent_requests", config.concurrent_requests(), 1)?;
    validate_range("retry_attempts", config.retry_attempts(), 1, 10)?;
    validate_range("retry_delay_seconds", config.retry_delay().as_secs(), 0, 300)?;
    validate_range("timeout_seconds", config.request_timeout().as_secs(), 1, 600)?;
    Ok(())
}

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use crate::adapters::wayback::{DEFAULT_CDX_ENDPOINT, DEFAULT_WAYBACK_BASE};
    use crate::config::prompt::Prompter;
    use crate::config::toml_config::TomlConfig;
    use crate::domain::model::SearchRequest;
    use crate::utils::validation::{
        parse_keywords, parse_output_formats, parse_years, validate_target_url, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::io::{BufRead, Write};
    use std::time::Duration;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
    #[command(name = "archivantage")]
    #[command(about = "A gateway to analyze and explore the web archives")]
    pub struct CliConfig {
        /// URL to look up (http:// or https://)
        #[arg(long)]
        pub url: Option<String>,

        /// Comma-separated years, e.g. 2004,2008
        #[arg(long)]
        pub years: Option<String>,

        /// Comma-separated keywords to search snapshot pages for
        #[arg(long)]
        pub keywords: Option<String>,

        /// Comma-separated output formats: text, csv, json, html
        #[arg(long)]
        pub formats: Option<String>,

        /// Directory the per-site output directory is created in [default: .]
        #[arg(long)]
        pub output_path: Option<String>,

        /// Wayback CDX index endpoint
        #[arg(long)]
        pub cdx_endpoint: Option<String>,

        /// Prefix of snapshot replay URLs
        #[arg(long)]
        pub wayback_base: Option<String>,

        /// Attempts per CDX request [default: 3]
        #[arg(long)]
        pub retry_attempts: Option<u32>,

        /// Base delay between CDX attempts, multiplied by the attempt number [default: 1]
        #[arg(long)]
        pub retry_delay_seconds: Option<u64>,

        /// Per-request timeout [default: 30]
        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        /// Years processed at the same time [default: 4]
        #[arg(long)]
        pub concurrent_requests: Option<usize>,

        /// Log file [default: archivantage.log]
        #[arg(long)]
        pub log_file: Option<String>,

        /// TOML configuration file; flags given on the command line take precedence
        #[arg(short, long)]
        pub config: Option<String>,

        /// Enable verbose output
        #[arg(short, long)]
        pub verbose: bool,

        /// Log CPU and memory usage while running
        #[arg(long)]
        pub monitor: bool,

        /// Fail instead of prompting for missing values
        #[arg(long)]
        pub no_prompt: bool,
    }

    impl CliConfig {
        /// 以 TOML 設定補齊命令列未指定的值
        pub fn merge_toml(&mut self, toml: TomlConfig) {
            self.url = self.url.take().or(toml.target.url);
            self.years = self.years.take().or_else(|| {
                toml.target.years.map(|years| {
                    years
                        .iter()
                        .map(|y| y.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                })
            });
            self.keywords = self
                .keywords
                .take()
                .or_else(|| toml.target.keywords.map(|k| k.join(",")));
            self.formats = self
                .formats
                .take()
                .or_else(|| toml.load.output_formats.map(|f| f.join(",")));
            self.output_path = self.output_path.take().or(toml.load.output_path);
            self.cdx_endpoint = self.cdx_endpoint.take().or(toml.source.cdx_endpoint);
            self.wayback_base = self.wayback_base.take().or(toml.source.wayback_base);
            self.retry_attempts = self.retry_attempts.or(toml.source.retry_attempts);
            self.retry_delay_seconds = self.retry_delay_seconds.or(toml.source.retry_delay_seconds);
            self.timeout_seconds = self.timeout_seconds.or(toml.source.timeout_seconds);
            self.concurrent_requests = self.concurrent_requests.or(toml.extract.concurrent_requests);
            self.log_file = self.log_file.take().or(toml.monitoring.log_file);
            self.monitor = self.monitor || toml.monitoring.enabled.unwrap_or(false);
        }

        pub fn log_file(&self) -> &str {
            self.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE)
        }

        /// Builds the validated request from flags, prompting for anything
        /// missing when a prompter is available.
        ///
        /// Keywords are only asked for when the URL was asked for too.
        pub fn build_request<R: BufRead, W: Write>(
            &self,
            mut prompter: Option<&mut Prompter<R, W>>,
        ) -> Result<SearchRequest> {
            let url_given = self.url.is_some();

            let url = match (&self.url, prompter.as_deref_mut()) {
                (Some(url), _) => {
                    validate_target_url("url", url)?;
                    url.trim().to_string()
                }
                (None, Some(p)) => p.url()?,
                (None, None) => return Err(missing("url")),
            };

            let years = match (&self.years, prompter.as_deref_mut()) {
                (Some(raw), _) => parse_years(raw)?,
                (None, Some(p)) => p.years()?,
                (None, None) => return Err(missing("years")),
            };

            let keywords = match (&self.keywords, prompter.as_deref_mut()) {
                (Some(raw), _) => parse_keywords(raw),
                (None, Some(p)) if !url_given => p.keywords()?,
                (None, _) => Vec::new(),
            };

            let formats = match (&self.formats, prompter.as_deref_mut()) {
                (Some(raw), _) => parse_output_formats(raw)?,
                (None, Some(p)) => p.formats()?,
                (None, None) => return Err(missing("formats")),
            };

            Ok(SearchRequest {
                url,
                years,
                keywords,
                formats,
            })
        }
    }

    fn missing(field: &str) -> ArchiveError {
        ArchiveError::MissingConfigError {
            field: field.to_string(),
        }
    }

    impl ConfigProvider for CliConfig {
        fn cdx_endpoint(&self) -> &str {
            self.cdx_endpoint.as_deref().unwrap_or(DEFAULT_CDX_ENDPOINT)
        }

        fn wayback_base(&self) -> &str {
            self.wayback_base.as_deref().unwrap_or(DEFAULT_WAYBACK_BASE)
        }

        fn output_path(&self) -> &str {
            self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
        }

        fn concurrent_requests(&self) -> usize {
            self.concurrent_requests.unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
        }

        fn retry_attempts(&self) -> u32 {
            self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
        }

        fn retry_delay(&self) -> Duration {
            Duration::from_secs(self.retry_delay_seconds.unwrap_or(DEFAULT_RETRY_DELAY_SECONDS))
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_settings(self)
        }
    }

}
