//! Router tests for the public pages, health checks and sign-in.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;

use common::{
    ADMIN, GUEST, IDENTITY_SECRET, TestApp, VENDOR, assertion_signed_with, principal, product,
};
use provision_store_core::{ProductCategory, UserRole};
use provision_store_storefront::backend::MemoryBackend;

fn stocked_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_product(product(1, "Basmati Rice", ProductCategory::Groceries, 120))
        .with_product(product(2, "Alphonso Mango", ProductCategory::Fruits, 450))
        .with_product(product(3, "Green Chilli", ProductCategory::Vegetables, 20))
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
async fn test_health_is_ok() {
    let mut app = TestApp::new(MemoryBackend::new());
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_readiness_follows_backend() {
    let backend = MemoryBackend::new();
    let mut app = TestApp::new(backend.clone());

    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);

    backend.fail_reads(Some("canister is stopped"));
    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

// ============================================================================
// Home Tests
// ============================================================================

#[tokio::test]
async fn test_home_lists_categories_and_deals() {
    let mut app = TestApp::new(stocked_backend());
    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Basmati Rice"));
    assert!(response.body.contains("Alphonso Mango"));
    assert!(response.body.contains("Household"));
    assert!(response.body.contains("?category=fruits"));
}

#[tokio::test]
async fn test_home_filters_by_category() {
    let mut app = TestApp::new(stocked_backend());
    let response = app.get("/?category=fruits").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Alphonso Mango"));
    assert!(!response.body.contains("Basmati Rice"));
    assert!(response.body.contains("View All"));
}

#[tokio::test]
async fn test_home_ignores_unknown_category() {
    let mut app = TestApp::new(stocked_backend());
    let response = app.get("/?category=furniture").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Alphonso Mango"));
    assert!(response.body.contains("Basmati Rice"));
}

#[tokio::test]
async fn test_home_shows_read_failure_inline() {
    let backend = stocked_backend();
    backend.fail_reads(Some("Actor not available"));
    let mut app = TestApp::new(backend);

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Connection to the backend is not ready"));
}

// ============================================================================
// Product Tests
// ============================================================================

#[tokio::test]
async fn test_product_detail() {
    let mut app = TestApp::new(stocked_backend());
    let response = app.get("/products/2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Alphonso Mango"));
    assert!(response.body.contains("450"));
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let mut app = TestApp::new(stocked_backend());
    assert_eq!(app.get("/products/99").await.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Sign-in Tests
// ============================================================================

#[tokio::test]
async fn test_signed_out_header_offers_login() {
    let mut app = TestApp::new(MemoryBackend::new());
    let response = app.get("/").await;

    assert!(response.body.contains("action=\"/auth/start\""));
    assert!(!response.body.contains("action=\"/auth/logout\""));
    assert!(!response.body.contains("href=\"/account\""));
}

#[tokio::test]
async fn test_login_shows_principal_and_role() {
    let backend = MemoryBackend::new().with_role(&principal(VENDOR), UserRole::User);
    let mut app = TestApp::new(backend);

    app.login(VENDOR).await;
    let response = app.get("/").await;

    assert!(response.body.contains("action=\"/auth/logout\""));
    assert!(response.body.contains(&principal(VENDOR).abbreviated(8)));
    assert!(response.body.contains("<span class=\"badge\">Vendor</span>"));
    assert!(response.body.contains("href=\"/account\""));
}

#[tokio::test]
async fn test_invalid_login_reports_failure() {
    let mut app = TestApp::new(MemoryBackend::new());

    let response = app.post_form("/auth/login", "assertion=not-an-assertion").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));

    let response = app.get("/").await;
    assert!(response.body.contains("Sign-in failed"));
    assert!(response.body.contains("action=\"/auth/start\""));
}

#[tokio::test]
async fn test_bare_principal_cannot_sign_in() {
    let backend = MemoryBackend::new().with_role(&principal(ADMIN), UserRole::Admin);
    let mut app = TestApp::new(backend);

    let response = app.post_form("/auth/login", &format!("assertion={ADMIN}")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(app.get("/").await.body.contains("Sign-in failed"));

    let response = app
        .post_form("/admin/vendors/assign", &format!("principal={GUEST}"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.backend.calls("assignVendor"), 0);
}

#[tokio::test]
async fn test_assertion_from_unknown_signer_is_refused() {
    let backend = MemoryBackend::new().with_role(&principal(ADMIN), UserRole::Admin);
    let mut app = TestApp::new(backend);

    let forged = assertion_signed_with(ADMIN, "not_the_provider_secret");
    app.post_form("/auth/login", &format!("assertion={forged}")).await;

    let response = app.get("/").await;
    assert!(response.body.contains("Sign-in failed"));
    assert!(!response.body.contains("href=\"/admin/vendors\""));
}

#[tokio::test]
async fn test_provider_callback_signs_in() {
    let backend = MemoryBackend::new().with_role(&principal(ADMIN), UserRole::Admin);
    let mut app = TestApp::new(backend);

    let assertion = assertion_signed_with(ADMIN, IDENTITY_SECRET);
    let response = app.get(&format!("/auth/callback?assertion={assertion}")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));

    let response = app.get("/").await;
    assert!(response.body.contains("action=\"/auth/logout\""));
    assert!(response.body.contains("href=\"/admin/vendors\""));
}

#[tokio::test]
async fn test_sign_in_shows_progress_until_provider_returns() {
    let mut app = TestApp::new(MemoryBackend::new());

    let response = app.post_form("/auth/start", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location.unwrap();
    assert!(location.starts_with(
        "https://id.example.org/authorize?return_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"
    ));

    let response = app.get("/").await;
    assert!(response.body.contains("Signing in..."));
    assert!(!response.body.contains("Sign-in failed"));

    app.login(VENDOR).await;
    let response = app.get("/").await;
    assert!(!response.body.contains("Signing in..."));
    assert!(response.body.contains("action=\"/auth/logout\""));
}

#[tokio::test]
async fn test_logout_clears_identity() {
    let backend = MemoryBackend::new().with_role(&principal(ADMIN), UserRole::Admin);
    let mut app = TestApp::new(backend);

    app.login(ADMIN).await;
    assert!(app.get("/").await.body.contains("href=\"/admin/vendors\""));

    let response = app.post_form("/auth/logout", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = app.get("/").await;
    assert!(!response.body.contains("href=\"/admin/vendors\""));
    assert!(response.body.contains("action=\"/auth/start\""));
}

#[tokio::test]
async fn test_switching_identity_drops_previous_role() {
    let backend = MemoryBackend::new().with_role(&principal(ADMIN), UserRole::Admin);
    let mut app = TestApp::new(backend);

    app.login(ADMIN).await;
    assert!(app.get("/").await.body.contains("href=\"/admin/vendors\""));

    app.login(GUEST).await;
    let response = app.get("/").await;
    assert!(!response.body.contains("href=\"/admin/vendors\""));
    assert!(response.body.contains(&principal(GUEST).abbreviated(8)));
}
