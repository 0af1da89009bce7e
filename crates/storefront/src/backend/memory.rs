//! In-process backend.
//!
//! Mirrors the backend's permission rules closely enough to exercise the
//! rejection paths, and counts calls per operation so tests can assert on
//! cache behaviour.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use provision_store_core::{
    BuyerProfile, NewProduct, Price, Principal, Product, ProductId, UserProfile, UserRole,
};

use super::{BackendConnector, BackendError, StoreBackend};

#[derive(Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    roles: HashMap<Principal, UserRole>,
    buyer_profiles: HashMap<Principal, BuyerProfile>,
    user_profiles: HashMap<Principal, UserProfile>,
    calls: HashMap<&'static str, usize>,
    fail_reads: Option<String>,
}

/// Shared in-memory backend; clones share state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    read_delay: Option<Duration>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every read, to let concurrent reads overlap.
    #[must_use]
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn with_role(self, principal: &Principal, role: UserRole) -> Self {
        self.lock().roles.insert(principal.clone(), role);
        self
    }

    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        self.lock().products.insert(product.id, product);
        self
    }

    /// Make every read reject with `message` until cleared.
    pub fn fail_reads(&self, message: Option<&str>) {
        self.lock().fail_reads = message.map(str::to_string);
    }

    /// Number of calls made to `operation` so far.
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        self.lock().calls.get(operation).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl BackendConnector for MemoryBackend {
    fn connect(&self, caller: Option<&Principal>) -> Arc<dyn StoreBackend> {
        Arc::new(MemoryActor {
            store: self.clone(),
            caller: caller.cloned(),
        })
    }
}

struct MemoryActor {
    store: MemoryBackend,
    caller: Option<Principal>,
}

impl MemoryActor {
    fn record(&self, operation: &'static str) {
        *self.store.lock().calls.entry(operation).or_insert(0) += 1;
    }

    async fn read(&self, operation: &'static str) -> Result<(), BackendError> {
        self.record(operation);
        if let Some(delay) = self.store.read_delay {
            tokio::time::sleep(delay).await;
        }
        match self.store.lock().fail_reads.clone() {
            Some(message) => Err(BackendError::Rejected(message)),
            None => Ok(()),
        }
    }

    fn role(&self) -> UserRole {
        self.caller
            .as_ref()
            .and_then(|caller| self.store.lock().roles.get(caller).copied())
            .unwrap_or_default()
    }

    fn require_vendor(&self) -> Result<(), BackendError> {
        match self.role() {
            UserRole::Admin | UserRole::User => Ok(()),
            UserRole::Guest => Err(BackendError::Rejected(
                "Unauthorized: Only vendors can manage products".to_string(),
            )),
        }
    }

    fn require_admin(&self) -> Result<(), BackendError> {
        match self.role() {
            UserRole::Admin => Ok(()),
            UserRole::User | UserRole::Guest => Err(BackendError::Rejected(
                "Unauthorized: Only admins can assign roles".to_string(),
            )),
        }
    }

    fn require_caller(&self) -> Result<&Principal, BackendError> {
        self.caller.as_ref().ok_or_else(|| {
            BackendError::Rejected("Unauthorized: Anonymous callers cannot do this".to_string())
        })
    }

    fn require_self_or_admin(&self, target: &Principal) -> Result<(), BackendError> {
        if self.caller.as_ref() == Some(target) {
            return Ok(());
        }
        self.require_admin()
    }
}

#[async_trait]
impl StoreBackend for MemoryActor {
    async fn add_product(&self, product: &NewProduct) -> Result<(), BackendError> {
        self.record("addProduct");
        self.require_vendor()?;
        let mut state = self.store.lock();
        if state.products.contains_key(&product.id) {
            return Err(BackendError::Rejected(
                "Product with this ID already exists".to_string(),
            ));
        }
        state.products.insert(product.id, product.clone().into());
        Ok(())
    }

    async fn update_product_price(
        &self,
        id: ProductId,
        new_price: Price,
    ) -> Result<(), BackendError> {
        self.record("updateProductPrice");
        self.require_vendor()?;
        let mut state = self.store.lock();
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| BackendError::Rejected("Product not found".to_string()))?;
        product.price = new_price;
        Ok(())
    }

    async fn get_all_products(&self) -> Result<Vec<Product>, BackendError> {
        self.read("getAllProducts").await?;
        Ok(self.store.lock().products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        self.read("getProduct").await?;
        Ok(self.store.lock().products.get(&id).cloned())
    }

    async fn assign_vendor(&self, user: &Principal) -> Result<(), BackendError> {
        self.record("assignVendor");
        self.require_admin()?;
        self.store.lock().roles.insert(user.clone(), UserRole::User);
        Ok(())
    }

    async fn remove_vendor(&self, user: &Principal) -> Result<(), BackendError> {
        self.record("removeVendor");
        self.require_admin()?;
        self.store.lock().roles.insert(user.clone(), UserRole::Guest);
        Ok(())
    }

    async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), BackendError> {
        self.record("assignCallerUserRole");
        self.require_admin()?;
        self.store.lock().roles.insert(user.clone(), role);
        Ok(())
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError> {
        self.read("getCallerUserRole").await?;
        Ok(self.role())
    }

    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        self.read("isCallerAdmin").await?;
        Ok(self.role() == UserRole::Admin)
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        self.read("getCallerUserProfile").await?;
        let caller = self.require_caller()?;
        Ok(self.store.lock().user_profiles.get(caller).cloned())
    }

    async fn get_user_profile(
        &self,
        user: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.read("getUserProfile").await?;
        self.require_self_or_admin(user)?;
        Ok(self.store.lock().user_profiles.get(user).cloned())
    }

    async fn get_caller_buyer_profile(&self) -> Result<Option<BuyerProfile>, BackendError> {
        self.read("getCallerBuyerProfile").await?;
        let caller = self.require_caller()?;
        Ok(self.store.lock().buyer_profiles.get(caller).cloned())
    }

    async fn get_buyer_profile(
        &self,
        buyer: &Principal,
    ) -> Result<Option<BuyerProfile>, BackendError> {
        self.read("getBuyerProfile").await?;
        self.require_self_or_admin(buyer)?;
        Ok(self.store.lock().buyer_profiles.get(buyer).cloned())
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.record("saveCallerUserProfile");
        let caller = self.require_caller()?.clone();
        self.store.lock().user_profiles.insert(caller, profile.clone());
        Ok(())
    }

    async fn save_caller_buyer_profile(
        &self,
        profile: &BuyerProfile,
    ) -> Result<(), BackendError> {
        self.record("saveCallerBuyerProfile");
        let caller = self.require_caller()?.clone();
        self.store
            .lock()
            .buyer_profiles
            .insert(caller, profile.clone());
        Ok(())
    }
}
