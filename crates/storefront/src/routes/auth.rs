//! Sign-in and sign-out handlers.
//!
//! The identity provider authenticates the user and hands the storefront a
//! signed assertion naming the principal. The storefront verifies it, keeps
//! the principal in the session, and makes backend calls on its behalf.

use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::identity::{provider_login_url, unix_now, verify_assertion};
use crate::middleware::{
    clear_current_identity, set_current_identity, set_logging_in, set_login_error,
};
use crate::state::AppState;

/// Assertion returned by the identity provider.
#[derive(Debug, Deserialize)]
pub struct AssertionForm {
    #[serde(default)]
    pub assertion: String,
}

/// Send the browser to the identity provider.
#[instrument(skip_all)]
pub async fn start(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let config = state.config();
    let url = provider_login_url(&config.identity, &config.base_url)
        .map_err(|e| AppError::Internal(format!("sign-in URL: {e}")))?;

    set_logging_in(&session).await?;
    Ok(Redirect::to(url.as_str()))
}

/// Provider redirect carrying the assertion in the query string.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(form): Query<AssertionForm>,
) -> Result<impl IntoResponse> {
    complete_login(&state, &session, &form.assertion).await
}

/// Provider form post carrying the assertion.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AssertionForm>,
) -> Result<impl IntoResponse> {
    complete_login(&state, &session, &form.assertion).await
}

/// Sign in as the principal the assertion vouches for.
///
/// Signing in while already signed in replaces the previous identity and
/// drops its cached reads.
async fn complete_login(state: &AppState, session: &Session, assertion: &str) -> Result<Redirect> {
    let principal = match verify_assertion(assertion, &state.config().identity.secret, unix_now())
    {
        Ok(principal) => principal,
        Err(e) => {
            tracing::warn!(error = %e, "Login rejected");
            set_login_error(session).await?;
            return Ok(Redirect::to("/"));
        }
    };

    if let Some(previous) = clear_current_identity(session).await? {
        state.queries().forget_caller(&previous);
    }

    // Rotate the session id on privilege change
    session.cycle_id().await?;
    set_current_identity(session, &principal).await?;
    set_sentry_user(&principal);

    tracing::info!(principal = %principal, "Signed in");
    Ok(Redirect::to("/"))
}

/// Sign out and clear the caller's cached reads.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    if let Some(principal) = clear_current_identity(&session).await? {
        state.queries().forget_caller(&principal);
        tracing::info!(principal = %principal, "Signed out");
    }
    clear_sentry_user();

    Ok(Redirect::to("/"))
}
