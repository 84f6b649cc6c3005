//! Discord permission bits using bitflags.
//!
//! Bit positions are fixed by the Discord API and must never be renumbered.
//! Only `VIEW_CHANNEL` drives the exposure audit; the rest are named so that
//! bitmasks read sensibly in logs and tests.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

bitflags! {
    /// Discord permissions represented as a 64-bit bitfield.
    ///
    /// The API transmits these as decimal strings (e.g. `"1024"`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE      = 1 << 0;
        const KICK_MEMBERS               = 1 << 1;
        const BAN_MEMBERS                = 1 << 2;
        const ADMINISTRATOR              = 1 << 3;
        const MANAGE_CHANNELS            = 1 << 4;
        const MANAGE_GUILD               = 1 << 5;
        const ADD_REACTIONS              = 1 << 6;
        const VIEW_AUDIT_LOG             = 1 << 7;
        const PRIORITY_SPEAKER           = 1 << 8;
        const STREAM                     = 1 << 9;
        /// See a channel and read its messages
        const VIEW_CHANNEL               = 1 << 10;
        const SEND_MESSAGES              = 1 << 11;
        const SEND_TTS_MESSAGES          = 1 << 12;
        const MANAGE_MESSAGES            = 1 << 13;
        const EMBED_LINKS                = 1 << 14;
        const ATTACH_FILES               = 1 << 15;
        const READ_MESSAGE_HISTORY       = 1 << 16;
        const MENTION_EVERYONE           = 1 << 17;
        const USE_EXTERNAL_EMOJIS        = 1 << 18;
        const VIEW_GUILD_INSIGHTS        = 1 << 19;
        const CONNECT                    = 1 << 20;
        const SPEAK                      = 1 << 21;
        const MUTE_MEMBERS               = 1 << 22;
        const DEAFEN_MEMBERS             = 1 << 23;
        const MOVE_MEMBERS               = 1 << 24;
        const USE_VAD                    = 1 << 25;
        const CHANGE_NICKNAME            = 1 << 26;
        const MANAGE_NICKNAMES           = 1 << 27;
        const MANAGE_ROLES               = 1 << 28;
        const MANAGE_WEBHOOKS            = 1 << 29;
        const MANAGE_GUILD_EXPRESSIONS   = 1 << 30;
        const USE_APPLICATION_COMMANDS   = 1 << 31;
        const REQUEST_TO_SPEAK           = 1 << 32;
        const MANAGE_EVENTS              = 1 << 33;
        const MANAGE_THREADS             = 1 << 34;
        const CREATE_PUBLIC_THREADS      = 1 << 35;
        const CREATE_PRIVATE_THREADS     = 1 << 36;
        const USE_EXTERNAL_STICKERS      = 1 << 37;
        const SEND_MESSAGES_IN_THREADS   = 1 << 38;
        const USE_EMBEDDED_ACTIVITIES    = 1 << 39;
        const MODERATE_MEMBERS           = 1 << 40;
        const VIEW_CREATOR_MONETIZATION_ANALYTICS = 1 << 41;
        const USE_SOUNDBOARD             = 1 << 42;
        const CREATE_GUILD_EXPRESSIONS   = 1 << 43;
        const CREATE_EVENTS              = 1 << 44;
        const USE_EXTERNAL_SOUNDS        = 1 << 45;
        const SEND_VOICE_MESSAGES        = 1 << 46;
        const SEND_POLLS                 = 1 << 49;
        const USE_EXTERNAL_APPS          = 1 << 50;
    }
}

impl Permissions {
    /// Check if this permission set includes the specified permission(s).
    ///
    /// # Examples
    ///
    /// ```
    /// use exposure_watch::permissions::Permissions;
    ///
    /// let perms = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
    /// assert!(perms.has(Permissions::VIEW_CHANNEL));
    /// assert!(!perms.has(Permissions::ADMINISTRATOR));
    /// ```
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.contains(permission)
    }

    /// Build a permission set from raw bits, keeping bits this build does not name.
    #[must_use]
    pub const fn from_raw(bits: u64) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

/// A permission bitfield that is not a base-10 unsigned 64-bit integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid permission bitfield: {0:?}")]
pub struct ParsePermissionsError(pub String);

impl FromStr for Permissions {
    type Err = ParsePermissionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self::from_raw)
            .map_err(|_| ParsePermissionsError(s.to_string()))
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PermissionsVisitor;

impl Visitor<'_> for PermissionsVisitor {
    type Value = Permissions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a permission bitfield as a decimal string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Permissions::from_raw(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(Permissions::from_raw)
            .map_err(|_| E::custom(format!("negative permission bitfield: {v}")))
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PermissionsVisitor)
    }
}
