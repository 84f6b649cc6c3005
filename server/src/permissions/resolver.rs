//! Permission resolution logic.
//!
//! Decides whether the @everyone role can see a channel.

use super::flags::Permissions;
use crate::discord::types::{OverwriteKind, PermissionOverwrite};

/// Outcome of resolving `VIEW_CHANNEL` for the @everyone role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAccess {
    /// The @everyone overwrite denies view (wins over allow and baseline).
    ExplicitDeny,
    /// The @everyone overwrite allows view.
    ExplicitAllow,
    /// No overwrite decision; value is the role baseline.
    Inherited(bool),
}

impl ViewAccess {
    #[must_use]
    pub const fn is_visible(self) -> bool {
        match self {
            Self::ExplicitDeny => false,
            Self::ExplicitAllow => true,
            Self::Inherited(visible) => visible,
        }
    }
}

/// Find the @everyone overwrite on a channel.
///
/// Discord keys the @everyone role by the guild id. Only one such overwrite
/// should exist; if the data holds several, the first in input order wins.
#[must_use]
pub fn find_everyone_overwrite<'a>(
    overwrites: &'a [PermissionOverwrite],
    everyone_role_id: &str,
) -> Option<&'a PermissionOverwrite> {
    overwrites
        .iter()
        .find(|o| o.kind == OverwriteKind::Role && o.id == everyone_role_id)
}

/// Resolve @everyone view access for a channel.
///
/// Resolution order:
/// 1. View denied by the @everyone overwrite: hidden
/// 2. View allowed by the @everyone overwrite: visible
/// 3. Otherwise the `baseline` (the @everyone role's guild permissions) decides
///
/// Pass `Permissions::empty()` as `baseline` when role permissions are unknown;
/// the channel is then visible only through an explicit allow.
#[must_use]
pub fn resolve_view_access(
    overwrites: &[PermissionOverwrite],
    everyone_role_id: &str,
    baseline: Permissions,
) -> ViewAccess {
    let inherited = baseline.has(Permissions::VIEW_CHANNEL);

    let Some(ovr) = find_everyone_overwrite(overwrites, everyone_role_id) else {
        return ViewAccess::Inherited(inherited);
    };

    // Deny wins even when a malformed overwrite sets the bit on both sides
    if ovr.deny.has(Permissions::VIEW_CHANNEL) {
        ViewAccess::ExplicitDeny
    } else if ovr.allow.has(Permissions::VIEW_CHANNEL) {
        ViewAccess::ExplicitAllow
    } else {
        ViewAccess::Inherited(inherited)
    }
}

/// Whether the @everyone role can view a channel.
#[must_use]
pub fn resolve_visibility(
    overwrites: Option<&[PermissionOverwrite]>,
    everyone_role_id: &str,
    baseline: Permissions,
) -> bool {
    resolve_view_access(overwrites.unwrap_or_default(), everyone_role_id, baseline).is_visible()
}
