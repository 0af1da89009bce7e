//! Command implementations.
//!
//! Every command runs through one [`Actor`] bound to the `--caller`
//! principal, so the backend applies the same permission checks it applies
//! to the storefront.

pub mod access;
pub mod products;

use provision_store_core::{Principal, ProductId};
use provision_store_storefront::backend::{Actor, BackendError, HttpBackend};
use provision_store_storefront::config::{BackendConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Backend settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend call failed; shown as the normalized user message.
    #[error("{}", .0.user_message())]
    Backend(#[from] BackendError),

    /// The product does not exist.
    #[error("No product with ID {0}")]
    ProductNotFound(ProductId),
}

/// Connect to the backend as `caller`.
///
/// # Errors
///
/// Returns `CommandError` if the backend settings cannot be loaded or the
/// HTTP client cannot be built.
pub fn connect(caller: Option<Principal>) -> Result<Actor, CommandError> {
    let config = BackendConfig::from_env()?;
    let backend = HttpBackend::new(&config)?;

    match &caller {
        Some(principal) => tracing::debug!(caller = %principal, backend = %config.url, "Connecting"),
        None => tracing::debug!(backend = %config.url, "Connecting anonymously"),
    }

    Ok(Actor::connect(&backend, caller))
}
