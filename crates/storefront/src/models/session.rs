//! Session-stored state.

use serde::{Deserialize, Serialize};

/// Outcome of the most recent sign-in attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoginStatus {
    #[default]
    Idle,
    /// Sent to the identity provider, not back yet.
    LoggingIn,
    Success,
    LoginError,
}

impl LoginStatus {
    /// Whether a provider exchange is in flight.
    #[must_use]
    pub const fn is_logging_in(self) -> bool {
        matches!(self, Self::LoggingIn)
    }

    /// Whether the last attempt failed.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::LoginError)
    }

    /// Label for the login status badge.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Signed out",
            Self::LoggingIn => "Signing in...",
            Self::Success => "Signed in",
            Self::LoginError => "Sign-in failed",
        }
    }
}

/// Session keys.
pub mod session_keys {
    /// Principal of the signed-in caller.
    pub const CURRENT_IDENTITY: &str = "current_identity";

    /// Last [`LoginStatus`](super::LoginStatus).
    pub const LOGIN_STATUS: &str = "login_status";

    /// Persisted vendor-mode value.
    pub const VENDOR_MODE: &str = crate::vendor_mode::VENDOR_MODE_KEY;
}
