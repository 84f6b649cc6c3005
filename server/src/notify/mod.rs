//! Alert Delivery
//!
//! Sends audit reports either to an incoming webhook or as a bot message in a
//! channel. Reports longer than Discord's message limit are split on line
//! boundaries and sent in order.

pub mod error;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::discord::DiscordClient;

pub use error::NotifyError;

/// Discord rejects message content longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Where a guild's alerts go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertDestination {
    /// Discord incoming webhook URL.
    Webhook { url: String },
    /// Channel the bot posts into.
    Channel { channel_id: String },
}

impl AlertDestination {
    /// Short label for logs (never the webhook secret).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Webhook { .. } => "webhook",
            Self::Channel { .. } => "channel",
        }
    }
}

/// Delivers report text to an [`AlertDestination`].
#[derive(Debug, Clone)]
pub struct Notifier {
    discord: DiscordClient,
}

impl Notifier {
    #[must_use]
    pub const fn new(discord: DiscordClient) -> Self {
        Self { discord }
    }

    /// Send `text` to `destination`, split into as many messages as needed.
    ///
    /// Stops at the first rejected message.
    pub async fn notify(
        &self,
        destination: &AlertDestination,
        text: &str,
    ) -> Result<(), NotifyError> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        debug!(
            destination = destination.kind(),
            messages = chunks.len(),
            "Delivering alert"
        );

        // Discord rejects blank content
        for chunk in chunks.iter().filter(|c| !c.trim().is_empty()) {
            match destination {
                AlertDestination::Webhook { url } => self.post_webhook(url, chunk).await?,
                AlertDestination::Channel { channel_id } => {
                    self.discord.send_channel_message(channel_id, chunk).await?;
                }
            }
        }

        Ok(())
    }

    async fn post_webhook(&self, url: &str, content: &str) -> Result<(), NotifyError> {
        let response = self
            .discord
            .http()
            .post(url)
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

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Breaks between lines where possible; a single line longer than the limit is
/// cut at the character boundary.
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.is_empty() {
        return chunks;
    }

    let mut current = String::new();
    let mut current_len = 0;
    // `current` can hold only blank lines and still be a chunk
    let mut has_lines = false;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        // +1 for the newline joining it to `current`
        let needed = if has_lines { line_len + 1 } else { line_len };

        if current_len + needed <= max_chars {
            if has_lines {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            has_lines = true;
            continue;
        }

        if has_lines {
            chunks.push(std::mem::take(&mut current));
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            let mut pieces = chars.chunks(max_chars).map(|c| c.iter().collect::<String>());
            let last = pieces.next_back().unwrap_or_default();
            chunks.extend(pieces);
            current_len = last.chars().count();
            current = last;
        }
        has_lines = true;
    }

    if has_lines {
        chunks.push(current);
    }

    chunks
}
