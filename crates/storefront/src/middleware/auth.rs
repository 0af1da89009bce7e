//! Identity extractors.
//!
//! Sign-in happens at an external identity provider; the storefront keeps
//! the principal from a verified assertion (see [`crate::identity`]) in the
//! session and binds backend actors to it.

use axum::{
    extract::FromRequestParts,
    http::{Method, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use provision_store_core::Principal;

use crate::models::{LoginStatus, session_keys};

/// Extractor that requires a signed-in caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireIdentity(principal): RequireIdentity) -> impl IntoResponse {
///     format!("Signed in as {principal}")
/// }
/// ```
pub struct RequireIdentity(pub Principal);

/// Rejection for [`RequireIdentity`].
#[derive(Debug, Clone, Copy)]
pub enum IdentityRejection {
    /// Page requests go back to the store home, where sign-in lives.
    RedirectToHome,
    /// Form posts without a session.
    Unauthorized,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToHome => Redirect::to("/").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = if parts.method == Method::GET {
            IdentityRejection::RedirectToHome
        } else {
            IdentityRejection::Unauthorized
        };

        let session = parts.extensions.get::<Session>().ok_or(rejection)?;
        current_identity(session).await.map(Self).ok_or(rejection)
    }
}

/// Extractor for the caller, if signed in.
pub struct OptionalIdentity(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = match parts.extensions.get::<Session>() {
            Some(session) => current_identity(session).await,
            None => None,
        };

        Ok(Self(identity))
    }
}

async fn current_identity(session: &Session) -> Option<Principal> {
    session
        .get::<Principal>(session_keys::CURRENT_IDENTITY)
        .await
        .ok()
        .flatten()
}

/// Last login status, `Idle` when none was recorded.
pub async fn login_status(session: &Session) -> LoginStatus {
    session
        .get::<LoginStatus>(session_keys::LOGIN_STATUS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Record a successful sign-in.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_identity(
    session: &Session,
    principal: &Principal,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_IDENTITY, principal)
        .await?;
    session
        .insert(session_keys::LOGIN_STATUS, LoginStatus::Success)
        .await
}

/// Record that the caller was sent to the identity provider.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_logging_in(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::LOGIN_STATUS, LoginStatus::LoggingIn)
        .await
}

/// Record a failed sign-in.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_login_error(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::LOGIN_STATUS, LoginStatus::LoginError)
        .await
}

/// Clear the signed-in caller (logout).
///
/// Returns the principal that was signed in, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_identity(
    session: &Session,
) -> Result<Option<Principal>, tower_sessions::session::Error> {
    let previous = session
        .remove::<Principal>(session_keys::CURRENT_IDENTITY)
        .await?;
    session
        .remove::<LoginStatus>(session_keys::LOGIN_STATUS)
        .await?;
    Ok(previous)
}
