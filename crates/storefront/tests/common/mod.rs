//! Shared helpers for storefront router tests.
//!
//! Requests go through the full application router in process, backed by a
//! [`MemoryBackend`]; the session cookie is carried by hand between calls.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use secrecy::SecretString;
use tower::ServiceExt;
use url::Url;

use provision_store_core::{Price, Principal, Product, ProductCategory, ProductId};
use provision_store_storefront::backend::MemoryBackend;
use provision_store_storefront::config::{
    BackendConfig, IdentityConfig, QueryCacheConfig, StorefrontConfig,
};
use provision_store_storefront::identity::{sign_assertion, unix_now};
use provision_store_storefront::routes;
use provision_store_storefront::state::AppState;

pub const ADMIN: &str = "rrkah-fqaaa-aaaaa-aaaaq-cai";
pub const VENDOR: &str = "w7x7r-cok77-xa";
pub const GUEST: &str = "aaaaa-aa";

pub const IDENTITY_SECRET: &str = "shared_provider_signing_key";

pub fn principal(text: &str) -> Principal {
    Principal::from_text(text).expect("Failed to parse principal")
}

pub fn product(id: u64, name: &str, category: ProductCategory, price: u64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category,
        price: Price::new(price),
    }
}

pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap(),
        backend: BackendConfig {
            url: Url::parse("http://127.0.0.1:4943/api/").unwrap(),
            api_key: None,
            timeout: Duration::from_secs(5),
        },
        query_cache: QueryCacheConfig::default(),
        identity: IdentityConfig {
            provider_url: Url::parse("https://id.example.org/authorize").unwrap(),
            secret: SecretString::from(IDENTITY_SECRET),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The application router plus a handle on its backend and session cookie.
pub struct TestApp {
    router: Router,
    pub backend: MemoryBackend,
    cookie: Option<String>,
}

/// Assertion the identity provider would issue for `text` with `secret`.
pub fn assertion_signed_with(text: &str, secret: &str) -> String {
    sign_assertion(
        &principal(text),
        unix_now() + 300,
        &SecretString::from(secret),
    )
    .expect("Failed to sign assertion")
}

/// A response with its body read.
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestApp {
    pub fn new(backend: MemoryBackend) -> Self {
        let state = AppState::new(test_config(), Arc::new(backend.clone()));
        Self {
            router: routes::app(state),
            backend,
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Sign in with a provider-issued assertion and keep the session cookie.
    pub async fn login(&mut self, principal: &str) {
        let assertion = assertion_signed_with(principal, IDENTITY_SECRET);
        let response = self
            .post_form("/auth/login", &format!("assertion={assertion}"))
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert!(self.cookie.is_some(), "login did not set a session cookie");
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to call router");
        self.read(response).await
    }

    async fn read(&mut self, response: Response<Body>) -> TestResponse {
        if let Some(cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8"),
        }
    }
}
