//! Service Configuration
//!
//! Process settings come from environment variables; the list of audited
//! guilds comes from a JSON file. Both are loaded once at startup and are
//! read-only afterwards.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::audit::DEFAULT_CHANNEL_TYPES;
use crate::discord::DEFAULT_API_BASE;
use crate::notify::AlertDestination;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Discord bot token used for API reads and channel alerts
    pub bot_token: String,

    /// Discord REST API root
    pub discord_api_base: String,

    /// Path to the JSON guild list
    pub guilds_config_path: PathBuf,

    /// Seconds between scheduled audit passes (default: 3600)
    pub audit_interval_secs: u64,

    /// Run a pass as soon as the service starts (default: true)
    pub audit_on_startup: bool,

    /// Fetch roles so the @everyone baseline is considered (default: true)
    pub audit_role_baseline: bool,

    /// Channel type codes that are audited (default: 0, 5, 15)
    pub audit_channel_types: HashSet<u8>,

    /// Per-request timeout for outbound HTTP in seconds (default: 10)
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            bot_token: env::var("DISCORD_BOT_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .context("DISCORD_BOT_TOKEN must be set")?,
            discord_api_base: env::var("DISCORD_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            guilds_config_path: env::var("GUILDS_CONFIG_PATH")
                .unwrap_or_else(|_| "guilds.json".into())
                .into(),
            audit_interval_secs: env_secs("AUDIT_INTERVAL_SECS", 3600)?,
            audit_on_startup: env_bool("AUDIT_ON_STARTUP", true)?,
            audit_role_baseline: env_bool("AUDIT_ROLE_BASELINE", true)?,
            audit_channel_types: match env::var("AUDIT_CHANNEL_TYPES") {
                Ok(raw) => parse_channel_types(&raw)
                    .with_context(|| format!("AUDIT_CHANNEL_TYPES is invalid: {raw:?}"))?,
                Err(_) => DEFAULT_CHANNEL_TYPES.into_iter().collect(),
            },
            http_timeout_secs: env_secs("HTTP_TIMEOUT_SECS", 10)?,
        })
    }

    #[must_use]
    pub const fn audit_interval(&self) -> Duration {
        Duration::from_secs(self.audit_interval_secs)
    }

    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            bot_token: "test-token".into(),
            discord_api_base: "http://127.0.0.1:9".into(),
            guilds_config_path: "guilds.json".into(),
            audit_interval_secs: 3600,
            audit_on_startup: false,
            audit_role_baseline: true,
            audit_channel_types: DEFAULT_CHANNEL_TYPES.into_iter().collect(),
            http_timeout_secs: 5,
        }
    }
}

/// Read a positive number of seconds, or `default` when unset.
fn env_secs(name: &str, default: u64) -> Result<u64> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => anyhow::bail!("{name} must be greater than zero"),
        Ok(secs) => Ok(secs),
        Err(e) => Err(e).with_context(|| format!("{name} is not a number of seconds: {raw:?}")),
    }
}

/// Read a boolean flag, or `default` when unset.
fn env_bool(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => parse_bool(&raw).with_context(|| format!("{name} is not a boolean: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated list of channel type codes.
fn parse_channel_types(raw: &str) -> Result<HashSet<u8>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}

/// One audited guild.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildConfig {
    pub guild_id: String,
    pub guild_name: String,
    /// Channels that are public on purpose and never reported
    #[serde(default)]
    pub whitelist_channel_ids: HashSet<String>,
    /// Where this guild's alerts are sent
    pub alert: AlertDestination,
}

impl GuildConfig {
    #[must_use]
    pub fn is_whitelisted(&self, channel_id: &str) -> bool {
        self.whitelist_channel_ids.contains(channel_id)
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |what: &str| ConfigError::Invalid(format!("guild #{index}: {what} is empty"));

        if self.guild_id.trim().is_empty() {
            return Err(invalid("guild_id"));
        }
        if self.guild_name.trim().is_empty() {
            return Err(invalid("guild_name"));
        }
        if self.whitelist_channel_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(invalid("a whitelist channel id"));
        }
        match &self.alert {
            AlertDestination::Webhook { url } if url.trim().is_empty() => {
                Err(invalid("alert webhook url"))
            }
            AlertDestination::Channel { channel_id } if channel_id.trim().is_empty() => {
                Err(invalid("alert channel_id"))
            }
            _ => Ok(()),
        }
    }
}

/// Errors raised while loading the guild list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read guild config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Guild config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid guild config: {0}")]
    Invalid(String),
}

/// Parse and validate a guild list from JSON text.
pub fn parse_guilds(json: &str) -> Result<Vec<GuildConfig>, ConfigError> {
    let guilds: Vec<GuildConfig> = serde_json::from_str(json)?;

    if guilds.is_empty() {
        return Err(ConfigError::Invalid("no guilds configured".into()));
    }

    let mut seen = HashSet::new();
    for (index, guild) in guilds.iter().enumerate() {
        guild.validate(index)?;
        if !seen.insert(guild.guild_id.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "guild {} is listed more than once",
                guild.guild_id
            )));
        }
    }

    Ok(guilds)
}

/// Load and validate the guild list file.
pub fn load_guilds(path: &Path) -> Result<Vec<GuildConfig>, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_guilds(&json)
}
