//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Store home: categories and daily deals
//! GET  /products/{id}            - Product detail
//! GET  /health                   - Liveness
//! GET  /health/ready             - Readiness (backend reachable)
//!
//! # Vendor (rendered only in vendor mode; backend enforces roles)
//! GET  /vendor                   - Vendor dashboard with add-product form
//! POST /vendor/products          - Add product
//! GET  /vendor/prices            - Daily deals price editor
//! POST /vendor/prices/{id}       - Update one price
//! POST /vendor-mode/enable       - Turn vendor mode on
//! POST /vendor-mode/disable      - Turn vendor mode off
//!
//! # Admin
//! GET  /admin/vendors            - Vendor access manager and role assignment
//! POST /admin/vendors/assign     - Grant vendor access
//! POST /admin/vendors/remove     - Revoke vendor access
//! POST /admin/roles              - Assign a role
//! GET  /admin/users?principal=   - Jump to a user's page
//! GET  /admin/users/{principal}  - Inspect a user's profiles
//!
//! # Account (requires sign-in)
//! GET  /account                  - Buyer and user profiles
//! POST /account/buyer-profile    - Save buyer profile
//! POST /account/user-profile     - Save user profile
//!
//! # Auth
//! POST /auth/start               - Go to the identity provider
//! GET  /auth/callback            - Provider return with a signed assertion
//! POST /auth/login               - Provider form post with a signed assertion
//! POST /auth/logout              - Sign out
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod health;
pub mod home;
pub mod products;
pub mod vendor;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use provision_store_core::{AccessFlags, Principal};

use crate::backend::Actor;
use crate::middleware::{self, login_status};
use crate::models::LoginStatus;
use crate::state::AppState;
use crate::vendor_mode::VendorMode;

/// Characters of the signed-in principal shown in the header.
const HEADER_PRINCIPAL_LEN: usize = 8;

/// Data every page layout needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub principal: Option<Principal>,
    pub access: AccessFlags,
    pub vendor_mode: bool,
    pub login_status: LoginStatus,
}

impl PageContext {
    /// Gather the layout data for `actor`'s caller.
    pub async fn load(
        state: &AppState,
        actor: &Actor,
        vendor_mode: VendorMode,
        session: &Session,
    ) -> Self {
        Self {
            principal: actor.caller().cloned(),
            access: state.queries().access(actor).await,
            vendor_mode: vendor_mode.is_enabled(),
            login_status: login_status(session).await,
        }
    }

    /// Abbreviated principal for the header.
    #[must_use]
    pub fn short_principal(&self) -> String {
        self.principal
            .as_ref()
            .map(|p| p.abbreviated(HEADER_PRINCIPAL_LEN))
            .unwrap_or_default()
    }

    /// Label of the caller's resolved role.
    #[must_use]
    pub fn role_label(&self) -> &'static str {
        self.access.role.map_or("", |role| role.label())
    }
}

/// Create the vendor routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vendor::dashboard))
        .route("/products", post(vendor::add_product))
        .route("/prices", get(vendor::price_editor))
        .route("/prices/{id}", post(vendor::update_price))
}

/// Create the vendor-mode toggle router.
pub fn vendor_mode_routes() -> Router<AppState> {
    Router::new()
        .route("/enable", post(vendor::enable_mode))
        .route("/disable", post(vendor::disable_mode))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/vendors", get(admin::vendors))
        .route("/vendors/assign", post(admin::assign_vendor))
        .route("/vendors/remove", post(admin::remove_vendor))
        .route("/roles", post(admin::assign_role))
        .route("/users", get(admin::lookup))
        .route("/users/{principal}", get(admin::user))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/buyer-profile", post(account::save_buyer_profile))
        .route("/user-profile", post(account::save_user_profile))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/start", post(auth::start))
        .route("/callback", get(auth::callback))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/products/{id}", get(products::show))
        // Vendor routes
        .nest("/vendor", vendor_routes())
        .nest("/vendor-mode", vendor_mode_routes())
        // Admin routes
        .nest("/admin", admin_routes())
        // Account routes
        .nest("/account", account_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}

/// Build the application router with health checks, sessions and tracing.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
