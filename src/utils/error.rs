use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Rate limit reached while requesting {url}")]
    RateLimited { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ArchiveError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ArchiveError::Api(_) | ArchiveError::HttpStatus { .. } | ArchiveError::RateLimited { .. } => {
                ErrorCategory::Network
            }
            ArchiveError::ConfigError { .. }
            | ArchiveError::MissingConfigError { .. }
            | ArchiveError::InvalidConfigValueError { .. }
            | ArchiveError::ConfigValidationError { .. }
            | ArchiveError::ValidationError { .. } => ErrorCategory::Configuration,
            ArchiveError::Csv(_) | ArchiveError::Serialization(_) | ArchiveError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            ArchiveError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 5xx、429 與傳輸層錯誤可重試
    pub fn is_retryable(&self) -> bool {
        match self {
            ArchiveError::Api(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ArchiveError::RateLimited { .. } => true,
            ArchiveError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ArchiveError::Api(e) if e.is_timeout() => {
                "The request to the Wayback Machine timed out".to_string()
            }
            ArchiveError::Api(e) if e.is_connect() => {
                "Could not connect to the Wayback Machine".to_string()
            }
            ArchiveError::RateLimited { .. } => {
                "The Wayback Machine rate limit was reached".to_string()
            }
            ArchiveError::MissingConfigError { field } => {
                format!("No value was given for {}", field)
            }
            ArchiveError::InvalidConfigValueError { field, value, reason } => {
                format!("'{}' is not a valid {}: {}", value, field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ArchiveError::Api(_) => "Check your network connection and try again",
            ArchiveError::RateLimited { .. } => "Wait a few minutes before retrying, or lower --concurrent-requests",
            ArchiveError::HttpStatus { .. } => "The archive may be unavailable; try again later",
            ArchiveError::MissingConfigError { .. } => "Pass the value as a flag, in the config file, or run interactively",
            ArchiveError::InvalidConfigValueError { .. }
            | ArchiveError::ConfigValidationError { .. }
            | ArchiveError::ValidationError { .. }
            | ArchiveError::ConfigError { .. } => "Fix the input and run again",
            ArchiveError::Io(_) => "Check that the output directory is writable",
            ArchiveError::Csv(_) | ArchiveError::Serialization(_) | ArchiveError::ProcessingError { .. } => {
                "Re-run with --verbose and inspect the log file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = ArchiveError::HttpStatus {
            url: "http://web.archive.org/cdx/search/cdx".to_string(),
            status: 503,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.is_retryable());

        let err = ArchiveError::HttpStatus {
            url: "http://web.archive.org/cdx/search/cdx".to_string(),
            status: 404,
        };
        assert!(!err.is_retryable());

        let err = ArchiveError::MissingConfigError {
            field: "url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "No value was given for url");
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = ArchiveError::RateLimited {
            url: "http://web.archive.org/web/".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.recovery_suggestion().contains("concurrent"));
    }
}
