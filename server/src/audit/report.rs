//! Alert report text.

use super::auditor::{ExposureFinding, ExposureReason};
use crate::config::GuildConfig;

/// Build the alert message for a guild with exposed channels.
///
/// One line per finding with a channel mention, the raw id, and the topic on
/// an indented line when present.
#[must_use]
pub fn build_report(guild: &GuildConfig, findings: &[ExposureFinding]) -> String {
    let mut lines = vec![
        "🚨 **Channels visible to @everyone detected**".to_string(),
        String::new(),
        format!("Server: **{}** ({})", guild.guild_name, guild.guild_id),
        format!("Findings: {}", findings.len()),
        String::new(),
    ];

    for finding in findings {
        let suffix = match finding.reason {
            ExposureReason::InheritedFromRole => " (inherited from @everyone role)",
            ExposureReason::ExplicitAllow => "",
        };
        lines.push(format!("- <#{id}> (`{id}`){suffix}", id = finding.channel_id));
        if let Some(topic) = finding.topic.as_deref().filter(|t| !t.is_empty()) {
            lines.push(format!("    Topic: {topic}"));
        }
    }

    lines.push(String::new());
    lines.push(
        "> If a channel is meant to be public, add its ID to this server's whitelist.".to_string(),
    );
    lines.join("\n")
}
