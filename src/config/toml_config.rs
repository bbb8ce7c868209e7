use crate::adapters::wayback::{DEFAULT_CDX_ENDPOINT, DEFAULT_WAYBACK_BASE};
use crate::config::{
    validate_settings, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_OUTPUT_PATH, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_DELAY_SECONDS, DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::ConfigProvider;
use crate::utils::error::{ArchiveError, Result};
use crate::utils::validation::{validate_target_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub target: TargetConfig,
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub load: LoadConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: Option<String>,
    pub years: Option<Vec<u16>>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub cdx_endpoint: Option<String>,
    pub wayback_base: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: Option<bool>,
    pub log_file: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ArchiveError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ARCHIVE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ArchiveError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn cdx_endpoint(&self) -> &str {
        self.source.cdx_endpoint.as_deref().unwrap_or(DEFAULT_CDX_ENDPOINT)
    }

    fn wayback_base(&self) -> &str {
        self.source.wayback_base.as_deref().unwrap_or(DEFAULT_WAYBACK_BASE)
    }

    fn output_path(&self) -> &str {
        self.load.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn concurrent_requests(&self) -> usize {
        self.extract
            .concurrent_requests
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(
            self.source
                .retry_delay_seconds
                .unwrap_or(DEFAULT_RETRY_DELAY_SECONDS),
        )
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.target.url {
            validate_target_url("target.url", url)?;
        }
        validate_settings(self)
    }
}
