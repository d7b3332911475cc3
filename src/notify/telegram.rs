use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use super::{NotifyError, Notifier};

/// Telegram Bot API `sendMessage` transport bound to one chat.
pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    client: Client,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct BotApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }

    /// Single delivery attempt with the failure reason preserved.
    ///
    /// The request URL embeds the bot token, so it is stripped from transport errors.
    pub async fn try_send(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.send_message_url())
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": message,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        let reply: Option<BotApiReply> = response.json().await.ok();

        match reply {
            Some(BotApiReply { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotApiReply { description, .. }) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: "unreadable reply".to_string(),
            }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> bool {
        match self.try_send(message).await {
            Ok(()) => {
                debug!(chat_id = %self.chat_id, %message, "message sent");
                true
            }
            Err(e) => {
                error!(chat_id = %self.chat_id, error = %e, %message, "failed to send message");
                false
            }
        }
    }
}
