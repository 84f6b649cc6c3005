//! Permission types and @everyone visibility resolution.

pub mod flags;
pub mod resolver;

pub use flags::{ParsePermissionsError, Permissions};
pub use resolver::{find_everyone_overwrite, resolve_view_access, resolve_visibility, ViewAccess};
