//! Backend writes and the cache invalidation each one implies.
//!
//! Mutations call the actor directly. On success they drop the cached reads
//! whose data changed; on failure they leave the cache alone and return the
//! normalized message.

use std::iter;

use thiserror::Error;
use tracing::{info, instrument, warn};

use provision_store_core::{
    BuyerProfile, NewProduct, Price, Principal, ProductId, UserProfile, UserRole,
};

use super::{QueryClient, QueryKey};
use crate::backend::{Actor, BackendError};

/// A failed mutation, carrying the message to show the user.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct MutationError {
    message: String,
    #[source]
    source: BackendError,
}

impl MutationError {
    fn new(operation: &'static str, source: BackendError) -> Self {
        warn!(operation, error = %source, "Mutation failed");
        Self {
            message: source.user_message(),
            source,
        }
    }

    /// Normalized, user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying backend error.
    #[must_use]
    pub const fn backend_error(&self) -> &BackendError {
        &self.source
    }
}

impl QueryClient {
    /// Add a product (vendor only).
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor, product), fields(product_id = %product.id))]
    pub async fn add_product(
        &self,
        actor: &Actor,
        product: &NewProduct,
    ) -> Result<(), MutationError> {
        actor
            .backend()
            .add_product(product)
            .await
            .map_err(|e| MutationError::new("addProduct", e))?;

        info!("Product added");
        self.invalidate_products(product.id).await;
        Ok(())
    }

    /// Change a product's price (vendor only).
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor), fields(product_id = %id, new_price = %new_price))]
    pub async fn update_product_price(
        &self,
        actor: &Actor,
        id: ProductId,
        new_price: Price,
    ) -> Result<(), MutationError> {
        actor
            .backend()
            .update_product_price(id, new_price)
            .await
            .map_err(|e| MutationError::new("updateProductPrice", e))?;

        info!("Product price updated");
        self.invalidate_products(id).await;
        Ok(())
    }

    /// Grant vendor rights to `user` (admin only).
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor), fields(user = %user))]
    pub async fn assign_vendor(&self, actor: &Actor, user: &Principal) -> Result<(), MutationError> {
        actor
            .backend()
            .assign_vendor(user)
            .await
            .map_err(|e| MutationError::new("assignVendor", e))?;

        info!("Vendor access granted");
        self.invalidate_roles(actor, user).await;
        Ok(())
    }

    /// Revoke vendor rights from `user` (admin only).
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor), fields(user = %user))]
    pub async fn remove_vendor(&self, actor: &Actor, user: &Principal) -> Result<(), MutationError> {
        actor
            .backend()
            .remove_vendor(user)
            .await
            .map_err(|e| MutationError::new("removeVendor", e))?;

        info!("Vendor access removed");
        self.invalidate_roles(actor, user).await;
        Ok(())
    }

    /// Assign `role` to `user` (admin only).
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor), fields(user = %user, role = %role))]
    pub async fn assign_role(
        &self,
        actor: &Actor,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), MutationError> {
        actor
            .backend()
            .assign_caller_user_role(user, role)
            .await
            .map_err(|e| MutationError::new("assignCallerUserRole", e))?;

        info!("Role assigned");
        self.invalidate_roles(actor, user).await;
        Ok(())
    }

    /// Save the caller's buyer profile.
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor, profile))]
    pub async fn save_buyer_profile(
        &self,
        actor: &Actor,
        profile: &BuyerProfile,
    ) -> Result<(), MutationError> {
        actor
            .backend()
            .save_caller_buyer_profile(profile)
            .await
            .map_err(|e| MutationError::new("saveCallerBuyerProfile", e))?;

        if let Some(caller) = actor.caller() {
            self.invalidate(&QueryKey::CallerBuyerProfile(caller.clone()))
                .await;
            let caller = caller.clone();
            self.invalidate_where(move |key| {
                matches!(key, QueryKey::BuyerProfile { target, .. } if *target == caller)
            });
        }
        Ok(())
    }

    /// Save the caller's user profile.
    ///
    /// # Errors
    ///
    /// Returns `MutationError` if the backend rejects or cannot be reached.
    #[instrument(skip(self, actor, profile))]
    pub async fn save_user_profile(
        &self,
        actor: &Actor,
        profile: &UserProfile,
    ) -> Result<(), MutationError> {
        actor
            .backend()
            .save_caller_user_profile(profile)
            .await
            .map_err(|e| MutationError::new("saveCallerUserProfile", e))?;

        if let Some(caller) = actor.caller() {
            self.invalidate(&QueryKey::CallerUserProfile(caller.clone()))
                .await;
            let caller = caller.clone();
            self.invalidate_where(move |key| {
                matches!(key, QueryKey::UserProfile { target, .. } if *target == caller)
            });
        }
        Ok(())
    }

    async fn invalidate_products(&self, id: ProductId) {
        self.invalidate(&QueryKey::Products).await;
        self.invalidate(&QueryKey::Product(id)).await;
    }

    /// Role changes affect both the caller's cached role and the target's.
    async fn invalidate_roles(&self, actor: &Actor, target: &Principal) {
        for principal in actor.caller().into_iter().chain(iter::once(target)) {
            self.invalidate(&QueryKey::CallerUserRole(principal.clone()))
                .await;
            self.invalidate(&QueryKey::IsCallerAdmin(principal.clone()))
                .await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use provision_store_core::actor_error::{
        DUPLICATE_ID_MESSAGE, PRODUCT_NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE,
        VENDOR_ACCESS_MESSAGE,
    };
    use provision_store_core::{Product, ProductCategory};

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::QueryCacheConfig;
    use crate::queries::QueryState;

    fn principal(text: &str) -> Principal {
        Principal::from_text(text).unwrap()
    }

    fn admin() -> Principal {
        principal("aaaaa-aa")
    }

    fn vendor() -> Principal {
        principal("2vxsx-fae")
    }

    fn shopper() -> Principal {
        principal("rrkah-fqaaa-aaaaa-aaaaq-cai")
    }

    fn setup() -> (MemoryBackend, QueryClient) {
        let backend = MemoryBackend::new()
            .with_role(&admin(), UserRole::Admin)
            .with_role(&vendor(), UserRole::User);
        let queries = QueryClient::new(Arc::new(backend.clone()), QueryCacheConfig::default());
        (backend, queries)
    }

    fn toor_dal() -> NewProduct {
        NewProduct {
            id: ProductId::new(2),
            name: "Toor Dal".to_string(),
            price: Price::new(140),
            category: ProductCategory::Groceries,
        }
    }

    #[tokio::test]
    async fn test_add_product_refreshes_listing() {
        let (backend, queries) = setup();
        let actor = queries.actor(Some(vendor()));

        assert!(queries.all_products(&actor).await.into_data().unwrap().is_empty());

        queries.add_product(&actor, &toor_dal()).await.unwrap();

        let products = queries.all_products(&actor).await.into_data().unwrap();
        assert_eq!(products, vec![Product::from(toor_dal())]);
        assert_eq!(backend.calls("getAllProducts"), 2);
    }

    #[tokio::test]
    async fn test_update_price_refreshes_product() {
        let (_, queries) = setup();
        let actor = queries.actor(Some(vendor()));
        queries.add_product(&actor, &toor_dal()).await.unwrap();

        let before = queries.product(&actor, ProductId::new(2)).await;
        assert_eq!(before.into_data().unwrap().unwrap().price, Price::new(140));

        queries
            .update_product_price(&actor, ProductId::new(2), Price::new(150))
            .await
            .unwrap();

        let after = queries.product(&actor, ProductId::new(2)).await;
        assert_eq!(after.into_data().unwrap().unwrap().price, Price::new(150));
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache_and_normalizes() {
        let (backend, queries) = setup();
        let guest = queries.actor(Some(shopper()));

        queries.all_products(&guest).await;
        let err = queries.add_product(&guest, &toor_dal()).await.unwrap_err();

        assert_eq!(err.message(), VENDOR_ACCESS_MESSAGE);
        assert!(matches!(err.backend_error(), BackendError::Rejected(_)));
        queries.all_products(&guest).await;
        assert_eq!(backend.calls("getAllProducts"), 1);
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_products() {
        let (_, queries) = setup();
        let actor = queries.actor(Some(vendor()));
        queries.add_product(&actor, &toor_dal()).await.unwrap();

        let duplicate = queries.add_product(&actor, &toor_dal()).await.unwrap_err();
        assert_eq!(duplicate.to_string(), DUPLICATE_ID_MESSAGE);

        let missing = queries
            .update_product_price(&actor, ProductId::new(99), Price::new(1))
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), PRODUCT_NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_assign_vendor_refreshes_roles() {
        let (backend, queries) = setup();
        let admin_actor = queries.actor(Some(admin()));
        let shopper_actor = queries.actor(Some(shopper()));

        assert!(!queries.access(&shopper_actor).await.is_vendor);
        assert!(queries.access(&admin_actor).await.is_admin);

        queries.assign_vendor(&admin_actor, &shopper()).await.unwrap();

        assert!(queries.access(&shopper_actor).await.is_vendor);
        assert!(queries.access(&admin_actor).await.is_admin);
        // Both the admin's and the target's roles were fetched again.
        assert_eq!(backend.calls("getCallerUserRole"), 4);

        queries.remove_vendor(&admin_actor, &shopper()).await.unwrap();
        assert!(queries.access(&shopper_actor).await.is_guest);
    }

    #[tokio::test]
    async fn test_vendor_cannot_assign_roles() {
        let (_, queries) = setup();
        let actor = queries.actor(Some(vendor()));

        let err = queries
            .assign_role(&actor, &shopper(), UserRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.message(), VENDOR_ACCESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_anonymous_profile_save_is_unauthorized() {
        let (_, queries) = setup();
        let actor = queries.actor(None);

        let err = queries
            .save_buyer_profile(&actor, &BuyerProfile { name: "Asha".into() })
            .await
            .unwrap_err();
        assert_eq!(err.message(), UNAUTHORIZED_MESSAGE);
    }

    #[tokio::test]
    async fn test_save_buyer_profile_refreshes_profile_views() {
        let (backend, queries) = setup();
        let shopper_actor = queries.actor(Some(shopper()));
        let admin_actor = queries.actor(Some(admin()));

        assert!(matches!(
            queries.caller_buyer_profile(&shopper_actor).await,
            QueryState::Loaded(None)
        ));
        assert!(matches!(
            queries.buyer_profile(&admin_actor, &shopper()).await,
            QueryState::Loaded(None)
        ));

        let profile = BuyerProfile { name: "Asha".into() };
        queries.save_buyer_profile(&shopper_actor, &profile).await.unwrap();

        let own = queries.caller_buyer_profile(&shopper_actor).await;
        let seen_by_admin = queries.buyer_profile(&admin_actor, &shopper()).await;
        assert_eq!(own.into_data().unwrap(), Some(profile.clone()));
        assert_eq!(seen_by_admin.into_data().unwrap(), Some(profile));
        assert_eq!(backend.calls("getCallerBuyerProfile"), 2);
        assert_eq!(backend.calls("getBuyerProfile"), 2);
    }

    #[tokio::test]
    async fn test_buyer_and_user_profiles_are_separate() {
        let (_, queries) = setup();
        let actor = queries.actor(Some(shopper()));

        queries
            .save_user_profile(&actor, &UserProfile { name: "A. Rao".into() })
            .await
            .unwrap();

        assert!(matches!(
            queries.caller_buyer_profile(&actor).await,
            QueryState::Loaded(None)
        ));
        assert_eq!(
            queries.caller_user_profile(&actor).await.into_data().unwrap(),
            Some(UserProfile { name: "A. Rao".into() })
        );
    }
}
