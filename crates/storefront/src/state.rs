//! Application state shared across handlers.

use std::sync::Arc;

use provision_store_core::Principal;

use crate::backend::{Actor, BackendConnector};
use crate::config::StorefrontConfig;
use crate::queries::QueryClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the process-wide query cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    queries: QueryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `connector` - Creates backend actors for callers
    #[must_use]
    pub fn new(config: StorefrontConfig, connector: Arc<dyn BackendConnector>) -> Self {
        let queries = QueryClient::new(connector, config.query_cache);

        Self {
            inner: Arc::new(AppStateInner { config, queries }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the query client.
    #[must_use]
    pub fn queries(&self) -> &QueryClient {
        &self.inner.queries
    }

    /// Create a backend actor for `caller`.
    #[must_use]
    pub fn actor(&self, caller: Option<Principal>) -> Actor {
        self.inner.queries.actor(caller)
    }
}
