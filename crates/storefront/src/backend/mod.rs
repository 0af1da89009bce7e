//! Store backend facade.
//!
//! # Architecture
//!
//! - The backend canister is the source of truth for products, roles and
//!   profiles, and enforces every permission check
//! - An actor is bound to one caller (or to no caller); every `caller`-style
//!   operation answers for that identity
//! - A [`BackendConnector`] hands out actors; [`HttpBackend`] is the
//!   production connector that talks JSON to the backend gateway, and
//!   [`MemoryBackend`] keeps everything in process for tests and local runs
//!
//! # Example
//!
//! ```rust,ignore
//! use provision_store_storefront::backend::{Actor, HttpBackend};
//!
//! let backend = HttpBackend::new(&config.backend)?;
//! let actor = Actor::connect(&backend, Some(principal));
//!
//! let products = actor.backend().get_all_products().await?;
//! ```

mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use provision_store_core::{
    ActorFailure, BuyerProfile, NewProduct, Price, Principal, Product, ProductId, UserProfile,
    UserRole, normalize_actor_error,
};

/// Errors that can occur when calling the store backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the call; carries the reject or trap message.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Operation URL could not be built.
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    /// No actor exists for this call yet.
    #[error("Actor not available")]
    NotReady,

    /// The result did not have the shape the caller expected.
    #[error("Unexpected backend result: {0}")]
    Unexpected(String),
}

impl BackendError {
    /// The failure shape the message normalizer understands.
    ///
    /// Only backend rejections carry text to the user. Transport, decode and
    /// URL failures describe the storefront's own plumbing and are opaque.
    #[must_use]
    pub fn to_failure(&self) -> ActorFailure {
        match self {
            Self::Rejected(message) => ActorFailure::Text(message.clone()),
            Self::NotReady => ActorFailure::Exception("Actor not available".to_string()),
            Self::Http(_) | Self::Parse(_) | Self::Url(_) | Self::Unexpected(_) => {
                ActorFailure::Opaque
            }
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        let failure = self.to_failure();
        if failure == ActorFailure::Opaque {
            tracing::warn!(error = %self, "Backend failure shown as generic message");
        }
        normalize_actor_error(&failure)
    }
}

/// Operations exposed by the store backend.
///
/// Implementations are bound to one caller; the `caller` operations answer
/// for that identity.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn add_product(&self, product: &NewProduct) -> Result<(), BackendError>;

    async fn update_product_price(
        &self,
        id: ProductId,
        new_price: Price,
    ) -> Result<(), BackendError>;

    async fn get_all_products(&self) -> Result<Vec<Product>, BackendError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError>;

    /// Grant vendor rights (admin only).
    async fn assign_vendor(&self, user: &Principal) -> Result<(), BackendError>;

    /// Revoke vendor rights (admin only).
    async fn remove_vendor(&self, user: &Principal) -> Result<(), BackendError>;

    /// Assign any role (admin only).
    async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), BackendError>;

    /// The caller's role; callers without one are guests.
    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError>;

    async fn is_caller_admin(&self) -> Result<bool, BackendError>;

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError>;

    async fn get_user_profile(&self, user: &Principal)
    -> Result<Option<UserProfile>, BackendError>;

    async fn get_caller_buyer_profile(&self) -> Result<Option<BuyerProfile>, BackendError>;

    async fn get_buyer_profile(
        &self,
        buyer: &Principal,
    ) -> Result<Option<BuyerProfile>, BackendError>;

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;

    async fn save_caller_buyer_profile(&self, profile: &BuyerProfile)
    -> Result<(), BackendError>;
}

/// Creates actors bound to a caller.
pub trait BackendConnector: Send + Sync {
    /// Create an actor for `caller`, or an anonymous actor for `None`.
    fn connect(&self, caller: Option<&Principal>) -> Arc<dyn StoreBackend>;
}

/// A backend actor together with the identity it acts for.
#[derive(Clone)]
pub struct Actor {
    caller: Option<Principal>,
    backend: Arc<dyn StoreBackend>,
}

impl Actor {
    /// Create an actor for `caller` through `connector`.
    #[must_use]
    pub fn connect(connector: &dyn BackendConnector, caller: Option<Principal>) -> Self {
        let backend = connector.connect(caller.as_ref());
        Self { caller, backend }
    }

    /// The signed-in caller, if any.
    #[must_use]
    pub const fn caller(&self) -> Option<&Principal> {
        self.caller.as_ref()
    }

    #[must_use]
    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}
