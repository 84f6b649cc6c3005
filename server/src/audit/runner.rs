//! Audit Orchestration
//!
//! Runs an audit pass over every configured guild, on a timer or on demand.
//! Each guild is fetched, audited, and reported independently; a failure in
//! one guild is logged and never stops the others.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::auditor::{audit_guild, AuditOptions, ExposureFinding};
use super::error::AuditError;
use super::report::build_report;
use crate::config::{Config, GuildConfig};
use crate::discord::{build_http_client, DiscordClient};
use crate::notify::Notifier;

/// Result of one guild within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuildOutcome {
    Clean,
    Reported(usize),
    Failed,
}

/// Audits the configured guilds and delivers alerts.
///
/// Holds only read-only state, so concurrent passes are safe.
#[derive(Debug)]
pub struct AuditRunner {
    guilds: Vec<GuildConfig>,
    discord: DiscordClient,
    notifier: Notifier,
    options: AuditOptions,
    role_baseline: bool,
}

impl AuditRunner {
    /// Create a runner.
    ///
    /// With `role_baseline` off, roles are not fetched and only explicit
    /// @everyone overwrites can expose a channel.
    #[must_use]
    pub const fn new(
        guilds: Vec<GuildConfig>,
        discord: DiscordClient,
        notifier: Notifier,
        options: AuditOptions,
        role_baseline: bool,
    ) -> Self {
        Self {
            guilds,
            discord,
            notifier,
            options,
            role_baseline,
        }
    }

    /// Build a runner, its Discord client and notifier from service configuration.
    pub fn from_config(config: &Config, guilds: Vec<GuildConfig>) -> reqwest::Result<Self> {
        let http = build_http_client(config.http_timeout())?;
        let discord = DiscordClient::new(http, &config.discord_api_base, &config.bot_token);
        let notifier = Notifier::new(discord.clone());
        let options = AuditOptions {
            channel_types: config.audit_channel_types.clone(),
        };

        Ok(Self::new(
            guilds,
            discord,
            notifier,
            options,
            config.audit_role_baseline,
        ))
    }

    #[must_use]
    pub fn guilds(&self) -> &[GuildConfig] {
        &self.guilds
    }

    /// Run one audit pass over all guilds.
    ///
    /// Errors are logged per guild and never returned.
    pub async fn run_audit(&self) {
        let start = Instant::now();
        info!(guilds = self.guilds.len(), "Audit pass started");

        let outcomes = join_all(self.guilds.iter().map(|g| self.audit_and_report(g))).await;

        let failed = outcomes.iter().filter(|o| **o == GuildOutcome::Failed).count();
        let clean = outcomes.iter().filter(|o| **o == GuildOutcome::Clean).count();
        let findings: usize = outcomes
            .iter()
            .map(|o| match o {
                GuildOutcome::Reported(n) => *n,
                _ => 0,
            })
            .sum();

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            guilds = outcomes.len(),
            clean,
            reported = outcomes.len() - clean - failed,
            failed,
            findings,
            "Audit pass completed"
        );
    }

    async fn audit_and_report(&self, guild: &GuildConfig) -> GuildOutcome {
        match self.check_and_notify(guild).await {
            Ok(0) => GuildOutcome::Clean,
            Ok(n) => GuildOutcome::Reported(n),
            Err(e) => {
                error!(
                    guild_id = %guild.guild_id,
                    guild_name = %guild.guild_name,
                    stage = e.stage(),
                    error = %e,
                    "Guild audit failed"
                );
                GuildOutcome::Failed
            }
        }
    }

    async fn check_and_notify(&self, guild: &GuildConfig) -> Result<usize, AuditError> {
        let findings = self.check_guild(guild).await?;

        if findings.is_empty() {
            info!(
                guild_id = %guild.guild_id,
                guild_name = %guild.guild_name,
                "No problematic channels found"
            );
            return Ok(0);
        }

        let report = build_report(guild, &findings);
        self.notifier.notify(&guild.alert, &report).await?;

        info!(
            guild_id = %guild.guild_id,
            guild_name = %guild.guild_name,
            findings = findings.len(),
            destination = guild.alert.kind(),
            "Reported exposed channels"
        );
        Ok(findings.len())
    }

    /// Fetch a guild's channels (and roles) and audit them.
    ///
    /// Any fetch failure fails the whole guild; no partial findings.
    #[tracing::instrument(skip(self, guild), fields(guild_id = %guild.guild_id))]
    pub async fn check_guild(
        &self,
        guild: &GuildConfig,
    ) -> Result<Vec<ExposureFinding>, AuditError> {
        let guild_id = guild.guild_id.as_str();

        let (channels, roles) = if self.role_baseline {
            let (channels, roles) = tokio::try_join!(
                self.discord.fetch_channels(guild_id),
                self.discord.fetch_roles(guild_id)
            )?;
            (channels, Some(roles))
        } else {
            (self.discord.fetch_channels(guild_id).await?, None)
        };

        Ok(audit_guild(guild, &channels, roles.as_deref(), &self.options))
    }
}

/// Start the periodic audit task.
///
/// When `run_on_startup` is false the interval's immediate first tick is
/// consumed, so the first pass happens one `every` after start.
pub fn spawn_audit_task(
    runner: Arc<AuditRunner>,
    every: Duration,
    run_on_startup: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !run_on_startup {
            interval.tick().await;
        }
        loop {
            interval.tick().await;
            info!(
                trigger = "schedule",
                triggered_at = %chrono::Utc::now().to_rfc3339(),
                "Audit triggered"
            );
            runner.run_audit().await;
        }
    })
}

/// Start a pass in the background and return without waiting for it.
///
/// The handle is detached work; dropping it does not cancel the pass.
pub fn trigger_audit(runner: Arc<AuditRunner>) -> JoinHandle<()> {
    info!(
        trigger = "manual",
        triggered_at = %chrono::Utc::now().to_rfc3339(),
        "Audit triggered"
    );
    tokio::spawn(async move {
        runner.run_audit().await;
    })
}
