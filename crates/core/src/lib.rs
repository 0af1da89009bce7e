//! Provision Store Core - Shared types and pure logic.
//!
//! This crate provides the types and decision logic used across all
//! Provision Store components:
//! - `storefront` - Server-rendered store front-end
//! - `cli` - Operator commands against the store backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no sessions. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Products, categories, prices, roles, principals and profiles
//! - [`access`] - Capability flags derived from sign-in state and role lookup
//! - [`actor_error`] - User-facing messages for backend failures

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod actor_error;
pub mod types;

pub use access::{AccessFlags, RoleLookup, derive_access};
pub use actor_error::{ActorFailure, normalize_actor_error};
pub use types::*;
