//! Capability flags derived from sign-in state and the caller's role.
//!
//! Every screen that gates on authorization reads these flags instead of
//! looking at the role directly. The backend still enforces permissions on
//! every call; the flags only decide what is rendered.

use serde::Serialize;

use crate::types::UserRole;

/// State of the caller-role lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleLookup {
    /// Not issued (signed out, or the backend actor does not exist yet).
    NotStarted,
    /// Issued and not settled.
    Pending,
    /// Settled with a role.
    Resolved(UserRole),
    /// Settled with an error. Not retried.
    Failed,
}

impl RoleLookup {
    const fn role(self) -> Option<UserRole> {
        match self {
            Self::Resolved(role) => Some(role),
            Self::NotStarted | Self::Pending | Self::Failed => None,
        }
    }
}

/// What the current caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AccessFlags {
    pub is_signed_in: bool,
    pub is_checking_auth: bool,
    pub is_vendor: bool,
    pub is_admin: bool,
    pub is_authorized: bool,
    pub is_guest: bool,
    /// Resolved role; `None` when signed out or unresolved.
    pub role: Option<UserRole>,
}

impl AccessFlags {
    /// Flags for a caller with no identity.
    #[must_use]
    pub const fn signed_out() -> Self {
        derive_access(false, false, RoleLookup::NotStarted)
    }
}

/// Derive capability flags.
///
/// A role left over from an earlier session never counts once the caller is
/// signed out, and nothing is granted while the lookup is still pending.
#[must_use]
pub const fn derive_access(
    signed_in: bool,
    actor_initializing: bool,
    lookup: RoleLookup,
) -> AccessFlags {
    let role = if signed_in { lookup.role() } else { None };

    let is_checking_auth =
        actor_initializing || (signed_in && matches!(lookup, RoleLookup::Pending));
    let is_vendor = matches!(role, Some(UserRole::User));
    let is_admin = matches!(role, Some(UserRole::Admin));

    AccessFlags {
        is_signed_in: signed_in,
        is_checking_auth,
        is_vendor,
        is_admin,
        is_authorized: is_vendor || is_admin,
        is_guest: !signed_in || matches!(role, Some(UserRole::Guest)),
        role,
    }
}
