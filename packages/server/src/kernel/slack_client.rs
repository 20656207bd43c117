use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::BaseChatTransport;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Slack Web API client for outbound chat messages
pub struct SlackClient {
    bot_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(bot_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { bot_token, client })
    }
}

#[async_trait]
impl BaseChatTransport for SlackClient {
    async fn send_message(&self, channel: &str, text: &str) -> Result<String> {
        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.bot_token)
            .json(&PostMessageRequest { channel, text })
            .send()
            .await
            .context("Failed to send Slack message")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Slack API error {}: {}", status, body);
        }

        let parsed: PostMessageResponse = response
            .json()
            .await
            .context("Failed to parse Slack response")?;

        if !parsed.ok {
            anyhow::bail!(
                "Slack rejected message: {}",
                parsed.error.unwrap_or_else(|| "unknown_error".to_string())
            );
        }

        parsed.ts.context("Slack response missing message ts")
    }
}
