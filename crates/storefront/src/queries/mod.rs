//! Cached reads over the store backend.
//!
//! # Architecture
//!
//! - Every read has a [`QueryKey`]; results are cached in `moka` with a
//!   configurable TTL
//! - Concurrent reads of the same key share one backend call
//! - Caller-scoped reads are only issued for a signed-in caller and
//!   report [`QueryState::Disabled`] otherwise
//! - Failures are not cached and not retried
//! - Mutations (see `mutations`) invalidate the keys whose data they change
//!
//! # Example
//!
//! ```rust,ignore
//! let actor = queries.actor(Some(principal));
//!
//! match queries.all_products(&actor).await {
//!     QueryState::Loaded(products) => render(products),
//!     QueryState::Failed(err) => alert(err.user_message()),
//!     QueryState::Disabled => {}
//! }
//! ```

mod cache;
mod mutations;

pub use cache::{CacheValue, QueryKey};
pub use mutations::MutationError;

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, warn};

use provision_store_core::{
    AccessFlags, BuyerProfile, Principal, Product, ProductId, RoleLookup, UserProfile, UserRole,
    derive_access,
};

use crate::backend::{Actor, BackendConnector, BackendError};
use crate::config::QueryCacheConfig;

/// Outcome of a cached read.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    /// The read was not issued (no signed-in caller).
    Disabled,
    Loaded(T),
    /// The read failed; nothing was cached.
    Failed(Arc<BackendError>),
}

impl<T> QueryState<T> {
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            Self::Disabled | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Loaded(data) => Some(data),
            Self::Disabled | Self::Failed(_) => None,
        }
    }

    /// Normalized error message when the read failed.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Failed(err) => Some(err.user_message()),
            Self::Disabled | Self::Loaded(_) => None,
        }
    }
}

/// Process-wide query cache over a backend connector.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<QueryClientInner>,
}

struct QueryClientInner {
    connector: Arc<dyn BackendConnector>,
    cache: Cache<QueryKey, CacheValue>,
}

impl QueryClient {
    /// Create a query client.
    #[must_use]
    pub fn new(connector: Arc<dyn BackendConnector>, config: QueryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl)
            .support_invalidation_closures()
            .build();

        Self {
            inner: Arc::new(QueryClientInner { connector, cache }),
        }
    }

    /// Create an actor for `caller`.
    #[must_use]
    pub fn actor(&self, caller: Option<Principal>) -> Actor {
        Actor::connect(self.inner.connector.as_ref(), caller)
    }

    /// Read through the cache.
    async fn fetch<T, F>(
        &self,
        key: QueryKey,
        load: F,
        extract: fn(CacheValue) -> Option<T>,
    ) -> QueryState<T>
    where
        F: Future<Output = Result<CacheValue, BackendError>>,
    {
        let label = key.label();
        match self.inner.cache.entry(key).or_try_insert_with(load).await {
            Ok(entry) => {
                if !entry.is_fresh() {
                    debug!(query = label, "Cache hit");
                }
                extract(entry.into_value()).map_or_else(
                    || {
                        tracing::error!(query = label, "Cached value has the wrong shape");
                        QueryState::Failed(Arc::new(BackendError::Unexpected(format!(
                            "cached {label} value has the wrong shape"
                        ))))
                    },
                    QueryState::Loaded,
                )
            }
            Err(err) => {
                warn!(query = label, error = %err, "Query failed");
                QueryState::Failed(err)
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All products (the daily deals).
    pub async fn all_products(&self, actor: &Actor) -> QueryState<Vec<Product>> {
        self.fetch(
            QueryKey::Products,
            async { actor.backend().get_all_products().await.map(CacheValue::Products) },
            |value| match value {
                CacheValue::Products(products) => Some(products),
                _ => None,
            },
        )
        .await
    }

    /// One product, `None` if it does not exist.
    pub async fn product(&self, actor: &Actor, id: ProductId) -> QueryState<Option<Product>> {
        self.fetch(
            QueryKey::Product(id),
            async { actor.backend().get_product(id).await.map(CacheValue::Product) },
            |value| match value {
                CacheValue::Product(product) => Some(product),
                _ => None,
            },
        )
        .await
    }

    /// The caller's role. Disabled when signed out.
    pub async fn caller_user_role(&self, actor: &Actor) -> QueryState<UserRole> {
        let Some(caller) = actor.caller() else {
            return QueryState::Disabled;
        };
        self.fetch(
            QueryKey::CallerUserRole(caller.clone()),
            async { actor.backend().get_caller_user_role().await.map(CacheValue::Role) },
            |value| match value {
                CacheValue::Role(role) => Some(role),
                _ => None,
            },
        )
        .await
    }

    /// Whether the caller is an admin. Disabled when signed out.
    pub async fn is_caller_admin(&self, actor: &Actor) -> QueryState<bool> {
        let Some(caller) = actor.caller() else {
            return QueryState::Disabled;
        };
        self.fetch(
            QueryKey::IsCallerAdmin(caller.clone()),
            async { actor.backend().is_caller_admin().await.map(CacheValue::Flag) },
            |value| match value {
                CacheValue::Flag(flag) => Some(flag),
                _ => None,
            },
        )
        .await
    }

    /// The caller's buyer profile. Disabled when signed out.
    pub async fn caller_buyer_profile(&self, actor: &Actor) -> QueryState<Option<BuyerProfile>> {
        let Some(caller) = actor.caller() else {
            return QueryState::Disabled;
        };
        self.fetch(
            QueryKey::CallerBuyerProfile(caller.clone()),
            async {
                actor
                    .backend()
                    .get_caller_buyer_profile()
                    .await
                    .map(CacheValue::BuyerProfile)
            },
            |value| match value {
                CacheValue::BuyerProfile(profile) => Some(profile),
                _ => None,
            },
        )
        .await
    }

    /// The caller's user profile. Disabled when signed out.
    pub async fn caller_user_profile(&self, actor: &Actor) -> QueryState<Option<UserProfile>> {
        let Some(caller) = actor.caller() else {
            return QueryState::Disabled;
        };
        self.fetch(
            QueryKey::CallerUserProfile(caller.clone()),
            async {
                actor
                    .backend()
                    .get_caller_user_profile()
                    .await
                    .map(CacheValue::UserProfile)
            },
            |value| match value {
                CacheValue::UserProfile(profile) => Some(profile),
                _ => None,
            },
        )
        .await
    }

    /// Another user's profile, as seen by the caller (admins may view any).
    pub async fn user_profile(
        &self,
        actor: &Actor,
        target: &Principal,
    ) -> QueryState<Option<UserProfile>> {
        let Some(caller) = actor.caller() else {
            return QueryState::Disabled;
        };
        let key = QueryKey::UserProfile {
            caller: caller.clone(),
            target: target.clone(),
        };
        self.fetch(
            key,
            async {
                actor
                    .backend()
                    .get_user_profile(target)
                    .await
                    .map(CacheValue::UserProfile)
            },
            |value| match value {
                CacheValue::UserProfile(profile) => Some(profile),
                _ => None,
            },
        )
        .await
    }

    /// Another buyer's profile, as seen by the caller (admins may view any).
    pub async fn buyer_profile(
        &self,
        actor: &Actor,
        target: &Principal,
    ) -> QueryState<Option<BuyerProfile>> {
        let Some(caller) = actor.caller() else {
            return QueryState::Disabled;
        };
        let key = QueryKey::BuyerProfile {
            caller: caller.clone(),
            target: target.clone(),
        };
        self.fetch(
            key,
            async {
                actor
                    .backend()
                    .get_buyer_profile(target)
                    .await
                    .map(CacheValue::BuyerProfile)
            },
            |value| match value {
                CacheValue::BuyerProfile(profile) => Some(profile),
                _ => None,
            },
        )
        .await
    }

    /// Capability flags for the actor's caller.
    ///
    /// The role lookup settles before this returns, so the flags are never
    /// in the "checking" state here.
    pub async fn access(&self, actor: &Actor) -> AccessFlags {
        let lookup = match self.caller_user_role(actor).await {
            QueryState::Disabled => RoleLookup::NotStarted,
            QueryState::Loaded(role) => RoleLookup::Resolved(role),
            QueryState::Failed(_) => RoleLookup::Failed,
        };
        derive_access(actor.caller().is_some(), false, lookup)
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drop one cached read so the next read goes to the backend.
    pub async fn invalidate(&self, key: &QueryKey) {
        debug!(query = key.label(), "Invalidating query");
        self.inner.cache.invalidate(key).await;
    }

    /// Drop every cached read matching `predicate`.
    fn invalidate_where<P>(&self, predicate: P)
    where
        P: Fn(&QueryKey) -> bool + Send + Sync + 'static,
    {
        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(move |key, _| predicate(key))
        {
            tracing::error!(error = %e, "Failed to register cache invalidation");
        }
    }

    /// Forget everything cached for `caller` (on logout).
    pub fn forget_caller(&self, caller: &Principal) {
        debug!(caller = %caller, "Clearing caller-scoped queries");
        let caller = caller.clone();
        self.invalidate_where(move |key| key.caller() == Some(&caller));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use provision_store_core::{Price, ProductCategory};

    use super::*;
    use crate::backend::MemoryBackend;

    fn principal(text: &str) -> Principal {
        Principal::from_text(text).unwrap()
    }

    fn rice() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Basmati Rice".to_string(),
            category: ProductCategory::Groceries,
            price: Price::new(120),
        }
    }

    fn client(backend: &MemoryBackend) -> QueryClient {
        QueryClient::new(Arc::new(backend.clone()), QueryCacheConfig::default())
    }

    #[tokio::test]
    async fn test_products_are_cached() {
        let backend = MemoryBackend::new().with_product(rice());
        let queries = client(&backend);
        let actor = queries.actor(None);

        let first = queries.all_products(&actor).await.into_data().unwrap();
        let second = queries.all_products(&actor).await.into_data().unwrap();

        assert_eq!(first, vec![rice()]);
        assert_eq!(first, second);
        assert_eq!(backend.calls("getAllProducts"), 1);
    }

    #[tokio::test]
    async fn test_caller_scoped_reads_disabled_when_signed_out() {
        let backend = MemoryBackend::new();
        let queries = client(&backend);
        let actor = queries.actor(None);

        assert!(matches!(
            queries.caller_user_role(&actor).await,
            QueryState::Disabled
        ));
        assert!(matches!(
            queries.caller_buyer_profile(&actor).await,
            QueryState::Disabled
        ));
        assert!(matches!(
            queries.user_profile(&actor, &principal("aaaaa-aa")).await,
            QueryState::Disabled
        ));
        assert_eq!(backend.calls("getCallerUserRole"), 0);
        assert_eq!(backend.calls("getCallerBuyerProfile"), 0);
        assert_eq!(backend.calls("getUserProfile"), 0);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_call() {
        let backend = MemoryBackend::new()
            .with_product(rice())
            .with_read_delay(Duration::from_millis(50));
        let queries = client(&backend);
        let actor = queries.actor(None);

        let (a, b) = tokio::join!(queries.all_products(&actor), queries.all_products(&actor));

        assert_eq!(a.into_data().unwrap().len(), 1);
        assert_eq!(b.into_data().unwrap().len(), 1);
        assert_eq!(backend.calls("getAllProducts"), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let backend = MemoryBackend::new().with_product(rice());
        let queries = client(&backend);
        let actor = queries.actor(None);

        backend.fail_reads(Some("Canister is stopping"));
        let failed = queries.all_products(&actor).await;
        assert_eq!(
            failed.error_message().as_deref(),
            Some("Canister is stopping")
        );

        backend.fail_reads(None);
        let loaded = queries.all_products(&actor).await;
        assert_eq!(loaded.into_data().unwrap(), vec![rice()]);
        assert_eq!(backend.calls("getAllProducts"), 2);
    }

    #[tokio::test]
    async fn test_role_cache_is_per_caller() {
        let admin = principal("aaaaa-aa");
        let vendor = principal("2vxsx-fae");
        let backend = MemoryBackend::new()
            .with_role(&admin, UserRole::Admin)
            .with_role(&vendor, UserRole::User);
        let queries = client(&backend);

        let admin_flags = queries.access(&queries.actor(Some(admin))).await;
        let vendor_flags = queries.access(&queries.actor(Some(vendor))).await;

        assert!(admin_flags.is_admin && !admin_flags.is_vendor);
        assert!(vendor_flags.is_vendor && !vendor_flags.is_admin);
        assert_eq!(backend.calls("getCallerUserRole"), 2);
    }

    #[tokio::test]
    async fn test_failed_role_lookup_is_unauthorized() {
        let caller = principal("aaaaa-aa");
        let backend = MemoryBackend::new().with_role(&caller, UserRole::Admin);
        let queries = client(&backend);
        backend.fail_reads(Some("Actor not available"));

        let flags = queries.access(&queries.actor(Some(caller))).await;

        assert!(flags.is_signed_in);
        assert!(!flags.is_authorized);
        assert!(!flags.is_checking_auth);
    }

    #[tokio::test]
    async fn test_signed_out_access() {
        let backend = MemoryBackend::new();
        let queries = client(&backend);

        let flags = queries.access(&queries.actor(None)).await;

        assert_eq!(flags, AccessFlags::signed_out());
        assert_eq!(backend.calls("getCallerUserRole"), 0);
    }

    #[tokio::test]
    async fn test_forget_caller_only_touches_that_caller() {
        let alice = principal("aaaaa-aa");
        let bob = principal("2vxsx-fae");
        let backend = MemoryBackend::new();
        let queries = client(&backend);
        let alice_actor = queries.actor(Some(alice.clone()));
        let bob_actor = queries.actor(Some(bob));

        queries.caller_user_role(&alice_actor).await;
        queries.caller_user_role(&bob_actor).await;
        queries.all_products(&alice_actor).await;

        queries.forget_caller(&alice);

        queries.caller_user_role(&alice_actor).await;
        queries.caller_user_role(&bob_actor).await;
        queries.all_products(&alice_actor).await;

        assert_eq!(backend.calls("getCallerUserRole"), 3);
        assert_eq!(backend.calls("getAllProducts"), 1);
    }
}
