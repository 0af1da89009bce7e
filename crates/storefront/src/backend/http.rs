//! JSON-over-HTTP connector for the store backend gateway.
//!
//! Each operation is `POST {url}/{operation}` with a JSON array of positional
//! arguments. A 2xx response carries the JSON result (`null` for operations
//! without one); anything else carries the reject or trap message as text.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use provision_store_core::{
    BuyerProfile, NewProduct, Price, Principal, Product, ProductId, UserProfile, UserRole,
};

use super::{BackendConnector, BackendError, StoreBackend};
use crate::config::BackendConfig;

/// Header carrying the caller's principal.
pub const CALLER_HEADER: &str = "x-caller-principal";

/// Connector for the backend gateway.
///
/// Cheap to clone; every actor it creates shares one HTTP client.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<SecretString>,
}

impl HttpBackend {
    /// Create a connector from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                endpoint: with_trailing_slash(config.url.clone()),
                api_key: config.api_key.clone(),
            }),
        })
    }
}

impl BackendConnector for HttpBackend {
    fn connect(&self, caller: Option<&Principal>) -> Arc<dyn StoreBackend> {
        Arc::new(HttpActor {
            inner: Arc::clone(&self.inner),
            caller: caller.cloned(),
        })
    }
}

/// Actor bound to one caller.
struct HttpActor {
    inner: Arc<HttpBackendInner>,
    caller: Option<Principal>,
}

impl HttpActor {
    /// Call one backend operation.
    #[instrument(
        skip(self, args),
        fields(caller = self.caller.as_ref().map_or("anonymous", Principal::as_str))
    )]
    async fn call<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        args: Value,
    ) -> Result<R, BackendError> {
        let url = operation_url(&self.inner.endpoint, operation)?;

        let mut request = self.inner.client.post(url).json(&args);
        if let Some(caller) = &self.caller {
            request = request.header(CALLER_HEADER, caller.as_str());
        }
        if let Some(key) = &self.inner.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = %status, "Backend rejected call");
            return Err(BackendError::Rejected(reject_message(status, &body)));
        }

        match serde_json::from_str(&body) {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(BackendError::Parse(e))
            }
        }
    }
}

#[async_trait]
impl StoreBackend for HttpActor {
    async fn add_product(&self, product: &NewProduct) -> Result<(), BackendError> {
        self.call(
            "addProduct",
            json!([product.id, product.name, product.price, product.category]),
        )
        .await
    }

    async fn update_product_price(
        &self,
        id: ProductId,
        new_price: Price,
    ) -> Result<(), BackendError> {
        self.call("updateProductPrice", json!([id, new_price])).await
    }

    async fn get_all_products(&self) -> Result<Vec<Product>, BackendError> {
        self.call("getAllProducts", json!([])).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        self.call("getProduct", json!([id])).await
    }

    async fn assign_vendor(&self, user: &Principal) -> Result<(), BackendError> {
        self.call("assignVendor", json!([user])).await
    }

    async fn remove_vendor(&self, user: &Principal) -> Result<(), BackendError> {
        self.call("removeVendor", json!([user])).await
    }

    async fn assign_caller_user_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), BackendError> {
        self.call("assignCallerUserRole", json!([user, role])).await
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError> {
        // An unset role comes back as null
        let role: Option<UserRole> = self.call("getCallerUserRole", json!([])).await?;
        Ok(role.unwrap_or_default())
    }

    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        self.call("isCallerAdmin", json!([])).await
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        self.call("getCallerUserProfile", json!([])).await
    }

    async fn get_user_profile(
        &self,
        user: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.call("getUserProfile", json!([user])).await
    }

    async fn get_caller_buyer_profile(&self) -> Result<Option<BuyerProfile>, BackendError> {
        self.call("getCallerBuyerProfile", json!([])).await
    }

    async fn get_buyer_profile(
        &self,
        buyer: &Principal,
    ) -> Result<Option<BuyerProfile>, BackendError> {
        self.call("getBuyerProfile", json!([buyer])).await
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.call("saveCallerUserProfile", json!([profile])).await
    }

    async fn save_caller_buyer_profile(
        &self,
        profile: &BuyerProfile,
    ) -> Result<(), BackendError> {
        self.call("saveCallerBuyerProfile", json!([profile])).await
    }
}

/// Make `Url::join` append operations instead of replacing the last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn operation_url(endpoint: &Url, operation: &str) -> Result<Url, url::ParseError> {
    endpoint.join(operation)
}

/// Reject text from an error response, falling back to the status line.
fn reject_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}
