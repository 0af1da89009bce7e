//! Identity assertions from the external identity provider.
//!
//! The provider authenticates the user and sends the browser back to
//! `/auth/callback` with an assertion:
//!
//! ```text
//! <principal>.<expires_at>.<hex hmac-sha256(secret, "<principal>.<expires_at>")>
//! ```
//!
//! The secret is shared between the provider and the storefront
//! (`STORE_IDENTITY_SECRET`). Only an assertion that verifies and has not
//! expired signs a caller in; a bare principal never does.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;
use url::Url;

use provision_store_core::{Principal, PrincipalError};

use crate::config::IdentityConfig;

type HmacSha256 = Hmac<Sha256>;

/// Path the provider returns to.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Why an assertion was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Malformed identity assertion")]
    Malformed,

    #[error("Invalid principal in identity assertion: {0}")]
    Principal(#[from] PrincipalError),

    #[error("Identity assertion signature does not verify")]
    BadSignature,

    #[error("Identity assertion expired")]
    Expired,

    #[error("Identity secret cannot be used as a key")]
    InvalidKey,
}

fn mac(secret: &SecretString, payload: &str) -> Result<HmacSha256, IdentityError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| IdentityError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Issue an assertion for `principal`, valid until `expires_at` (unix seconds).
///
/// This is the provider's half of the exchange.
///
/// # Errors
///
/// Returns `IdentityError::InvalidKey` if the secret cannot key the MAC.
pub fn sign_assertion(
    principal: &Principal,
    expires_at: u64,
    secret: &SecretString,
) -> Result<String, IdentityError> {
    let payload = format!("{principal}.{expires_at}");
    let signature = hex::encode(mac(secret, &payload)?.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// Verify an assertion and return the principal it vouches for.
///
/// The signature is checked in constant time before anything in the
/// payload is trusted.
///
/// # Errors
///
/// Returns `IdentityError` when the assertion is malformed, forged,
/// expired, or names an invalid principal.
pub fn verify_assertion(
    assertion: &str,
    secret: &SecretString,
    now: u64,
) -> Result<Principal, IdentityError> {
    let (payload, signature) = assertion
        .trim()
        .rsplit_once('.')
        .ok_or(IdentityError::Malformed)?;
    let (principal, expires_at) = payload.rsplit_once('.').ok_or(IdentityError::Malformed)?;
    let signature = hex::decode(signature).map_err(|_| IdentityError::Malformed)?;

    mac(secret, payload)?
        .verify_slice(&signature)
        .map_err(|_| IdentityError::BadSignature)?;

    let expires_at: u64 = expires_at.parse().map_err(|_| IdentityError::Malformed)?;
    if expires_at <= now {
        return Err(IdentityError::Expired);
    }

    Ok(Principal::from_text(principal)?)
}

/// Current time in unix seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Provider sign-in URL that returns to this storefront's callback.
///
/// # Errors
///
/// Returns an error if the callback URL cannot be built from `base_url`.
pub fn provider_login_url(
    config: &IdentityConfig,
    base_url: &Url,
) -> Result<Url, url::ParseError> {
    let callback = base_url.join(CALLBACK_PATH)?;
    let mut url = config.provider_url.clone();
    url.query_pairs_mut()
        .append_pair("return_to", callback.as_str());
    Ok(url)
}
