//! Exposure Watch
//!
//! Audits Discord guilds for channels that the @everyone role can see and
//! alerts each guild's operators when one is found.

pub mod api;
pub mod audit;
pub mod config;
pub mod discord;
pub mod notify;
pub mod permissions;
