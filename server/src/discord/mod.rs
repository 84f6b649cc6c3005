//! Discord API Gateway
//!
//! Fetches channels and roles for audited guilds. Nothing is cached; every
//! audit pass reads fresh data.

pub mod client;
pub mod error;
pub mod types;

pub use client::{build_http_client, DiscordClient, DEFAULT_API_BASE};
pub use error::FetchError;
pub use types::{channel_type, Channel, OverwriteKind, PermissionOverwrite, Role};
