//! Telegram Bot API delivery.
//!
//! API: `POST /bot{token}/sendMessage` with a form-encoded body.
//! The response body is not inspected beyond the HTTP status.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::debug;

use super::Notifier;
use crate::config::AlertSecrets;

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

const CHANNEL_NAME: &str = "telegram";

/// Sends scan summaries to a Telegram chat.
pub struct TelegramNotifier {
    http: Client,
    base_url: String,
    secrets: AlertSecrets,
}

impl TelegramNotifier {
    pub fn new(secrets: AlertSecrets, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client for Telegram")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secrets,
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.base_url,
            self.secrets.bot_token.expose_secret()
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let form = [
            ("chat_id", self.secrets.chat_id.as_str()),
            ("text", text),
        ];

        // The URL carries the bot token; keep it out of error messages.
        let resp = self
            .http
            .post(self.send_message_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Telegram request failed: {}", e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error {status}: {body}");
        }

        debug!(chars = text.len(), "Telegram message delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        CHANNEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn notifier(base: &str) -> TelegramNotifier {
        TelegramNotifier::new(
            AlertSecrets {
                bot_token: SecretString::new("123:abc".into()),
                chat_id: "-1001".into(),
            },
            base,
        )
        .unwrap()
    }

    #[test]
    fn test_send_message_url() {
        let n = notifier("https://api.telegram.org/");
        assert_eq!(n.send_message_url(), "https://api.telegram.org/bot123:abc/sendMessage");
        assert_eq!(n.name(), "telegram");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error_without_token() {
        let n = notifier("http://127.0.0.1:9");
        let err = n.notify("hello").await.unwrap_err();
        assert!(!err.to_string().contains("123:abc"));
    }
}
