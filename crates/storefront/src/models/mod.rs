//! Storefront-side models.
//!
//! Backend records live in `provision_store_core`; this module only holds
//! what the storefront keeps in the HTTP session.

pub mod session;

pub use session::{LoginStatus, session_keys};
