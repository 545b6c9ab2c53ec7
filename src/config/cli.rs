use crate::config::{default_class_hint, Settings, TomlConfig};
use crate::core::ClassHint;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "shift-code-scraper")]
#[command(about = "Scrape Borderlands 4 SHiFT codes and append new ones to a CSV file")]
pub struct CliConfig {
    #[arg(long, value_name = "FILE", help = "TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Source page URL")]
    pub url: Option<String>,

    #[arg(long, value_name = "PATH", help = "CSV output path [default: shift_codes.csv]")]
    pub csv: Option<PathBuf>,

    #[arg(long, help = "Show results without writing the CSV")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "HTML tag for the class-based scan [default: span]")]
    pub class_tag: Option<String>,

    #[arg(
        long = "class-token",
        value_name = "TOKEN",
        help = "Class token to match (repeatable) [default: task-name bold small]"
    )]
    pub class_tokens: Vec<String>,

    #[arg(long, help = "Skip the class-based scan and only use the page-wide scan")]
    pub no_class_hint: bool,

    #[arg(long, help = "Wait for Enter before exiting")]
    pub pause: bool,

    #[arg(long, help = "Keep codes listed in the expired section")]
    pub include_expired: bool,

    #[arg(long, value_name = "URL", help = "Discord webhook for newly found codes")]
    pub discord_webhook: Option<String>,

    #[arg(long, help = "Max codes per Discord message, 1-10 [default: no cap]")]
    pub webhook_batch_size: Option<usize>,

    #[arg(long, value_name = "SECONDS", help = "Request timeout [default: 10]")]
    pub timeout: Option<u64>,
}

impl CliConfig {
    /// Layers defaults, the optional TOML file and these flags into [`Settings`].
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading settings from {}", path.display());
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        self.apply_to(&mut settings);
        Ok(settings)
    }

    fn apply_to(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.page_url = url.clone();
        }
        if let Some(csv) = &self.csv {
            settings.csv_path = csv.clone();
        }
        if self.dry_run {
            settings.dry_run = true;
        }
        if self.include_expired {
            settings.include_expired = true;
        }

        if self.no_class_hint {
            settings.class_hint = None;
        } else if self.class_tag.is_some() || !self.class_tokens.is_empty() {
            let base = settings.class_hint.take().unwrap_or_else(default_class_hint);
            let tag = self.class_tag.clone().unwrap_or(base.tag);
            let tokens = if self.class_tokens.is_empty() {
                base.tokens
            } else {
                self.class_tokens.clone()
            };
            settings.class_hint = Some(ClassHint::new(tag, tokens));
        }

        if let Some(webhook) = &self.discord_webhook {
            settings.set_webhook(webhook);
        }
        if let Some(size) = self.webhook_batch_size {
            settings.webhook_batch_size = Some(size);
        }
        if let Some(secs) = self.timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::parse_from(std::iter::once("shift-code-scraper").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_flags_resolve_to_defaults() {
        let settings = parse(&[]).resolve().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--url",
            "https://example.com/codes",
            "--csv",
            "out.csv",
            "--dry-run",
            "--include-expired",
            "--class-tag",
            "td",
            "--class-token",
            "code",
            "--class-token",
            "shift",
            "--discord-webhook",
            "https://discord.com/api/webhooks/1/abc",
            "--webhook-batch-size",
            "3",
            "--timeout",
            "20",
            "-v",
        ]);
        assert!(cli.verbose);

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.page_url, "https://example.com/codes");
        assert_eq!(settings.csv_path, PathBuf::from("out.csv"));
        assert!(settings.dry_run);
        assert!(settings.include_expired);
        assert_eq!(
            settings.class_hint.map(|h| h.selector()).as_deref(),
            Some("td.code.shift")
        );
        assert_eq!(
            settings.discord_webhook.as_deref(),
            Some("https://discord.com/api/webhooks/1/abc")
        );
        assert_eq!(settings.webhook_batch_size, Some(3));
        assert_eq!(settings.request_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_no_class_hint_disables_scoped_scan() {
        let settings = parse(&["--no-class-hint", "--class-tag", "div"])
            .resolve()
            .unwrap();
        assert_eq!(settings.class_hint, None);
    }

    #[test]
    fn test_cli_overrides_toml_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[source]
url = "https://from-file.example.com"
timeout_seconds = 30

[store]
csv_path = "file.csv"
"#,
            )
            .unwrap();
        let path = temp_file.path().to_string_lossy().to_string();

        let settings = parse(&["--config", &path, "--csv", "flag.csv"])
            .resolve()
            .unwrap();

        assert_eq!(settings.page_url, "https://from-file.example.com");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.csv_path, PathBuf::from("flag.csv"));
    }
}
