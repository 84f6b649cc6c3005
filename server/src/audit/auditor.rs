//! Guild Auditor
//!
//! Turns already-fetched channels and roles into exposure findings. No I/O.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::config::GuildConfig;
use crate::discord::types::{channel_type, Channel, OverwriteKind, Role};
use crate::permissions::{resolve_view_access, Permissions, ViewAccess};

/// Channel types audited unless configured otherwise: text, announcement, forum.
pub const DEFAULT_CHANNEL_TYPES: [u8; 3] = [
    channel_type::GUILD_TEXT,
    channel_type::GUILD_ANNOUNCEMENT,
    channel_type::GUILD_FORUM,
];

/// Knobs for a guild audit.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Channel type codes that are checked; everything else is skipped.
    pub channel_types: HashSet<u8>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            channel_types: DEFAULT_CHANNEL_TYPES.into_iter().collect(),
        }
    }
}

/// Why a channel counts as exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureReason {
    /// The @everyone overwrite grants `VIEW_CHANNEL`.
    ExplicitAllow,
    /// No overwrite decides; the @everyone role itself grants `VIEW_CHANNEL`.
    InheritedFromRole,
}

/// A channel visible to @everyone that is not whitelisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExposureFinding {
    pub channel_id: String,
    pub name: String,
    pub topic: Option<String>,
    pub reason: ExposureReason,
}

/// Guild-level permissions of the @everyone role.
///
/// The @everyone role shares the guild's id. Returns empty when roles were
/// not fetched or the role is missing, which limits detection to explicit
/// overwrites.
#[must_use]
pub fn everyone_baseline(guild_id: &str, roles: Option<&[Role]>) -> Permissions {
    roles
        .unwrap_or_default()
        .iter()
        .find(|r| r.id == guild_id)
        .map(|r| r.permissions)
        .unwrap_or_default()
}

/// Audit one guild's channels for @everyone exposure.
///
/// Findings keep the order of `channels`.
#[must_use]
pub fn audit_guild(
    guild: &GuildConfig,
    channels: &[Channel],
    roles: Option<&[Role]>,
    options: &AuditOptions,
) -> Vec<ExposureFinding> {
    let baseline = everyone_baseline(&guild.guild_id, roles);

    channels
        .iter()
        .filter(|ch| options.channel_types.contains(&ch.kind))
        .filter(|ch| !guild.is_whitelisted(&ch.id))
        .filter_map(|ch| {
            warn_on_duplicate_everyone(guild, ch);

            let reason = match resolve_view_access(ch.overwrites(), &guild.guild_id, baseline) {
                ViewAccess::ExplicitAllow => ExposureReason::ExplicitAllow,
                ViewAccess::Inherited(true) => ExposureReason::InheritedFromRole,
                ViewAccess::ExplicitDeny | ViewAccess::Inherited(false) => return None,
            };

            Some(ExposureFinding {
                channel_id: ch.id.clone(),
                name: ch.name.clone(),
                topic: ch.topic.clone(),
                reason,
            })
        })
        .collect()
}

fn warn_on_duplicate_everyone(guild: &GuildConfig, channel: &Channel) {
    let count = channel
        .overwrites()
        .iter()
        .filter(|o| o.kind == OverwriteKind::Role && o.id == guild.guild_id)
        .count();

    if count > 1 {
        warn!(
            guild_id = %guild.guild_id,
            channel_id = %channel.id,
            count,
            "Channel has several @everyone overwrites; using the first"
        );
    }
}
