#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::adapters::http::{RetryPolicy, USER_AGENT};
use crate::core::{ClassHint, ConfigProvider};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://www.ign.com/wikis/borderlands-4/Borderlands_4_SHiFT_Codes";
pub const DEFAULT_CSV: &str = "shift_codes.csv";
pub const DEFAULT_CLASS_TAG: &str = "span";
pub const DEFAULT_CLASS_TOKENS: [&str; 3] = ["task-name", "bold", "small"];
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MAX_BATCH_SIZE: usize = 10;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const MAX_RETRY_BACKOFF_MS: u128 = 60_000;

pub fn default_class_hint() -> ClassHint {
    ClassHint::new(
        DEFAULT_CLASS_TAG,
        DEFAULT_CLASS_TOKENS.iter().map(|t| t.to_string()).collect(),
    )
}

/// Fully resolved run settings: defaults, then the TOML file, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub page_url: String,
    pub csv_path: PathBuf,
    pub dry_run: bool,
    pub include_expired: bool,
    /// `None` disables the class-scoped scan.
    pub class_hint: Option<ClassHint>,
    pub discord_webhook: Option<String>,
    /// Code lines per webhook message; `None` splits on message length only.
    pub webhook_batch_size: Option<usize>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_URL.to_string(),
            csv_path: PathBuf::from(DEFAULT_CSV),
            dry_run: false,
            include_expired: false,
            class_hint: Some(default_class_hint()),
            discord_webhook: None,
            webhook_batch_size: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Sets the webhook, treating a blank value as "not configured".
    pub fn set_webhook(&mut self, webhook: &str) {
        let webhook = webhook.trim();
        self.discord_webhook = (!webhook.is_empty()).then(|| webhook.to_string());
    }
}

impl ConfigProvider for Settings {
    fn page_url(&self) -> &str {
        &self.page_url
    }

    fn class_hint(&self) -> Option<&ClassHint> {
        self.class_hint.as_ref()
    }

    fn include_expired(&self) -> bool {
        self.include_expired
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("url", &self.page_url)?;
        validate_path("csv", &self.csv_path.to_string_lossy())?;

        if let Some(hint) = &self.class_hint {
            validate_non_empty_string("class_tag", &hint.tag)?;
        }

        if let Some(webhook) = &self.discord_webhook {
            validate_url("discord_webhook", webhook)?;
        }

        if let Some(size) = self.webhook_batch_size {
            validate_range("webhook_batch_size", size, 1, MAX_BATCH_SIZE)?;
        }
        validate_positive_number("timeout", self.request_timeout.as_secs(), 1)?;
        validate_range("retry_attempts", self.retry.max_retries, 0, MAX_RETRY_ATTEMPTS)?;
        validate_range(
            "retry_backoff_ms",
            self.retry.backoff.as_millis(),
            0,
            MAX_RETRY_BACKOFF_MS,
        )?;
        validate_non_empty_string("user_agent", &self.user_agent)?;

        Ok(())
    }
}
