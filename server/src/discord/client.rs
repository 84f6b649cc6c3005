//! Discord REST Client
//!
//! Reads guild channels and roles, and posts channel messages, with a bot token.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::error::FetchError;
use super::types::{Channel, Role};
use crate::notify::NotifyError;

/// Default Discord REST API root.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Build the shared HTTP client used for Discord and webhook calls.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Discord API client authenticated as a bot.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl DiscordClient {
    /// Create a client for the given API root (no trailing slash needed).
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            http,
            api_base,
            bot_token: bot_token.into(),
        }
    }

    /// The underlying HTTP client, shared with webhook delivery.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bot {}", self.bot_token))
            .header(
                USER_AGENT,
                concat!(
                    "DiscordBot (https://github.com/yourorg/exposure-watch, ",
                    env!("CARGO_PKG_VERSION"),
                    ")"
                ),
            )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self.authorized(self.http.get(self.url(path))).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch every channel in a guild.
    pub async fn fetch_channels(&self, guild_id: &str) -> Result<Vec<Channel>, FetchError> {
        let channels: Vec<Channel> = self.get_json(&format!("/guilds/{guild_id}/channels")).await?;
        debug!(guild_id, count = channels.len(), "Fetched guild channels");
        Ok(channels)
    }

    /// Fetch every role in a guild, including @everyone.
    pub async fn fetch_roles(&self, guild_id: &str) -> Result<Vec<Role>, FetchError> {
        let roles: Vec<Role> = self.get_json(&format!("/guilds/{guild_id}/roles")).await?;
        debug!(guild_id, count = roles.len(), "Fetched guild roles");
        Ok(roles)
    }

    /// Post a plain text message to a channel.
    pub async fn send_channel_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<(), NotifyError> {
        let response = self
            .authorized(self.http.post(self.url(&format!("/channels/{channel_id}/messages"))))
            .json(&json!({ "content": content }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        Ok(())
    }
}
