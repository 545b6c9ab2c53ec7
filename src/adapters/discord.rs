use crate::core::{ExpirationMap, Notifier};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Stays under Discord's 4096-character embed description limit.
pub const DESCRIPTION_BUDGET: usize = 3900;
pub const EMBED_TITLE: &str = "New Borderlands 4 SHiFT Codes";
pub const EMBED_COLOR: u32 = 0xBF1313;

#[derive(Debug, Serialize)]
struct WebhookPayload {
    embeds: Vec<Embed>,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    url: String,
    color: u32,
    description: String,
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<String>,
}

/// Bullet line for one code: ``• `CODE` — expiration``.
pub fn format_line(code: &str, expirations: &ExpirationMap) -> String {
    let expiration = expirations
        .get(&code.to_ascii_uppercase())
        .map(String::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or("Unknown");
    format!("• `{}` — {}", code, expiration)
}

/// Packs lines into descriptions of at most `budget` characters and
/// `max_lines` lines each. A single over-long line still gets its own chunk.
pub fn chunk_lines(lines: &[String], budget: usize, max_lines: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for line in lines {
        let line_len = line.chars().count();
        let over_budget = current_len + 1 + line_len > budget;
        if !current.is_empty() && (over_budget || current.len() >= max_lines) {
            chunks.push(current.join("\n"));
            current.clear();
            current_len = 0;
        }
        current_len += if current.is_empty() { line_len } else { line_len + 1 };
        current.push(line);
    }
    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}

/// Posts new codes to a Discord webhook, one embed per message.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    page_url: String,
    /// Code lines per message; `None` splits on the character budget alone.
    batch_size: Option<usize>,
}

impl DiscordNotifier {
    pub fn new(
        client: Client,
        webhook_url: String,
        page_url: String,
        batch_size: Option<usize>,
    ) -> Self {
        Self {
            client,
            webhook_url,
            page_url,
            batch_size: batch_size.map(|size| size.max(1)),
        }
    }

    fn payload(&self, description: String) -> WebhookPayload {
        WebhookPayload {
            embeds: vec![Embed {
                title: EMBED_TITLE.to_string(),
                url: self.page_url.clone(),
                color: EMBED_COLOR,
                description,
            }],
            allowed_mentions: AllowedMentions { parse: vec![] },
        }
    }

    async fn post(&self, description: String) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&self.payload(description))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ScrapeError::WebhookError {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, codes: &[String], expirations: &ExpirationMap) -> Result<()> {
        if codes.is_empty() {
            return Ok(());
        }

        let lines: Vec<String> = codes
            .iter()
            .map(|code| format_line(code, expirations))
            .collect();
        let max_lines = self.batch_size.unwrap_or(usize::MAX);
        let chunks = chunk_lines(&lines, DESCRIPTION_BUDGET, max_lines);
        tracing::debug!("Posting {} code(s) in {} message(s)", codes.len(), chunks.len());

        for description in chunks {
            self.post(description).await?;
        }
        Ok(())
    }
}
