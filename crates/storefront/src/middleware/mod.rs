//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, request transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//!
//! Identity and vendor mode are read per request through the extractors in
//! [`auth`] and [`vendor_mode`].

pub mod auth;
pub mod session;
pub mod vendor_mode;

pub use auth::{
    OptionalIdentity, RequireIdentity, clear_current_identity, login_status,
    set_current_identity, set_logging_in, set_login_error,
};
pub use session::create_session_layer;
pub use vendor_mode::{CurrentVendorMode, set_vendor_mode};
