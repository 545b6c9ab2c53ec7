use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Failed to fetch '{url}': {source}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch '{url}': HTTP {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Webhook HTTP {status}: {body}")]
    WebhookError { status: u16, body: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Notification,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    High,
    Critical,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::FetchError { .. }
            | ScrapeError::HttpStatusError { .. }
            | ScrapeError::HttpError(_) => ErrorCategory::Network,
            ScrapeError::CsvError(_) | ScrapeError::IoError(_) => ErrorCategory::Storage,
            ScrapeError::WebhookError { .. } => ErrorCategory::Notification,
            ScrapeError::ConfigError { .. } | ScrapeError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Notification => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::FetchError { url, .. } => {
                format!("Could not reach the code page at {}", url)
            }
            ScrapeError::HttpStatusError { url, status } => {
                format!("The code page at {} answered with HTTP {}", url, status)
            }
            ScrapeError::HttpError(e) => format!("HTTP client problem: {}", e),
            ScrapeError::CsvError(e) => format!("The CSV file could not be processed: {}", e),
            ScrapeError::IoError(e) => format!("File access failed: {}", e),
            ScrapeError::WebhookError { status, .. } => {
                format!("The webhook rejected the message (HTTP {})", status)
            }
            ScrapeError::ConfigError { message } => format!("Configuration problem: {}", message),
            ScrapeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Option '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check your connection and the --url value, then try again later"
            }
            ErrorCategory::Storage => {
                "Make sure the CSV path is writable and not open in another program"
            }
            ErrorCategory::Notification => "Verify the --discord-webhook URL is still valid",
            ErrorCategory::Configuration => "Run with --help to see the accepted options",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_network_category() {
        let err = ScrapeError::HttpStatusError {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.to_string(), "Failed to fetch 'https://example.com': HTTP 404");
    }

    #[test]
    fn test_server_errors_after_retries_are_high_severity() {
        let err = ScrapeError::HttpStatusError {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_webhook_errors_are_low_severity() {
        let err = ScrapeError::WebhookError {
            status: 400,
            body: "bad embed".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Notification);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.user_friendly_message().contains("400"));
    }

    #[test]
    fn test_config_errors_suggest_help() {
        let err = ScrapeError::InvalidConfigValueError {
            field: "url".to_string(),
            value: "ftp://example.com".to_string(),
            reason: "Unsupported URL scheme: ftp".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("--help"));
    }
}
