use crate::config::{default_class_hint, Settings};
use crate::core::ClassHint;
use crate::utils::error::{Result, ScrapeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Optional settings file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceConfig>,
    pub selector: Option<SelectorConfig>,
    pub store: Option<StoreConfig>,
    pub filter: Option<FilterConfig>,
    pub notify: Option<NotifyConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub enabled: Option<bool>,
    pub tag: Option<String>,
    pub tokens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub include_expired: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub discord_webhook: Option<String>,
    pub batch_size: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ScrapeError::ConfigError {
            message: format!("Cannot read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ScrapeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown names stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let name = &caps[1];
                std::env::var(name).unwrap_or_else(|_| format!("${{{}}}", name))
            })
            .into_owned()
    }

    /// Overlays every key present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(source) = &self.source {
            if let Some(url) = &source.url {
                settings.page_url = url.clone();
            }
            if let Some(secs) = source.timeout_seconds {
                settings.request_timeout = Duration::from_secs(secs);
            }
            if let Some(attempts) = source.retry_attempts {
                settings.retry.max_retries = attempts;
            }
            if let Some(ms) = source.retry_backoff_ms {
                settings.retry.backoff = Duration::from_millis(ms);
            }
            if let Some(agent) = &source.user_agent {
                settings.user_agent = agent.clone();
            }
        }

        if let Some(selector) = &self.selector {
            if selector.enabled == Some(false) {
                settings.class_hint = None;
            } else {
                let base = settings.class_hint.take().unwrap_or_else(default_class_hint);
                settings.class_hint = Some(ClassHint::new(
                    selector.tag.clone().unwrap_or(base.tag),
                    selector.tokens.clone().unwrap_or(base.tokens),
                ));
            }
        }

        if let Some(path) = self.store.as_ref().and_then(|s| s.csv_path.as_ref()) {
            settings.csv_path = path.clone();
        }

        if let Some(include) = self.filter.as_ref().and_then(|f| f.include_expired) {
            settings.include_expired = include;
        }

        if let Some(notify) = &self.notify {
            if let Some(webhook) = &notify.discord_webhook {
                settings.set_webhook(webhook);
            }
            if let Some(size) = notify.batch_size {
                settings.webhook_batch_size = Some(size);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());

        let mut settings = Settings::default();
        config.apply_to(&mut settings);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_and_apply_full_config() {
        let toml_content = r#"
[source]
url = "https://example.com/codes"
timeout_seconds = 30
retry_attempts = 1
retry_backoff_ms = 250
user_agent = "codes-bot/1.0"

[selector]
tag = "td"
tokens = ["code"]

[store]
csv_path = "data/codes.csv"

[filter]
include_expired = true

[notify]
discord_webhook = "https://discord.com/api/webhooks/1/abc"
batch_size = 5
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut settings = Settings::default();
        config.apply_to(&mut settings);

        assert_eq!(settings.page_url, "https://example.com/codes");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.retry.max_retries, 1);
        assert_eq!(settings.retry.backoff, Duration::from_millis(250));
        assert_eq!(settings.user_agent, "codes-bot/1.0");
        assert_eq!(
            settings.class_hint,
            Some(ClassHint::new("td", vec!["code".to_string()]))
        );
        assert_eq!(settings.csv_path, PathBuf::from("data/codes.csv"));
        assert!(settings.include_expired);
        assert_eq!(
            settings.discord_webhook.as_deref(),
            Some("https://discord.com/api/webhooks/1/abc")
        );
        assert_eq!(settings.webhook_batch_size, Some(5));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_huge_retry_backoff_fails_validation() {
        let config =
            TomlConfig::from_toml_str("[source]\nretry_backoff_ms = 9223372036854775807\n")
                .unwrap();
        let mut settings = Settings::default();
        config.apply_to(&mut settings);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_selector_can_be_disabled() {
        let config = TomlConfig::from_toml_str("[selector]\nenabled = false\n").unwrap();
        let mut settings = Settings::default();
        config.apply_to(&mut settings);
        assert_eq!(settings.class_hint, None);
    }

    #[test]
    fn test_partial_selector_keeps_default_tokens() {
        let config = TomlConfig::from_toml_str("[selector]\ntag = \"div\"\n").unwrap();
        let mut settings = Settings::default();
        config.apply_to(&mut settings);
        assert_eq!(
            settings.class_hint.map(|h| h.selector()).as_deref(),
            Some("div.task-name.bold.small")
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHIFT_TEST_WEBHOOK", "https://discord.com/api/webhooks/2/xyz");

        let toml_content = r#"
[notify]
discord_webhook = "${SHIFT_TEST_WEBHOOK}"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.notify.unwrap().discord_webhook.as_deref(),
            Some("https://discord.com/api/webhooks/2/xyz")
        );

        std::env::remove_var("SHIFT_TEST_WEBHOOK");
    }

    #[test]
    fn test_unknown_env_var_left_verbatim() {
        let config =
            TomlConfig::from_toml_str("[store]\ncsv_path = \"${SHIFT_TEST_UNSET_VAR}.csv\"\n")
                .unwrap();
        assert_eq!(
            config.store.unwrap().csv_path,
            Some(PathBuf::from("${SHIFT_TEST_UNSET_VAR}.csv"))
        );
    }

    #[test]
    fn test_empty_webhook_is_not_configured() {
        let config = TomlConfig::from_toml_str("[notify]\ndiscord_webhook = \"\"\n").unwrap();
        let mut settings = Settings::default();
        settings.discord_webhook = Some("https://discord.com/api/webhooks/1/abc".to_string());
        config.apply_to(&mut settings);
        assert_eq!(settings.discord_webhook, None);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[source\nurl = 1").unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\ncsv_path = \"from_file.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.store.and_then(|s| s.csv_path),
            Some(PathBuf::from("from_file.csv"))
        );
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TomlConfig::from_file("/nonexistent/shift.toml").unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigError { .. }));
    }
}
