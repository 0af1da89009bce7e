//! Provision Store storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused (the CLI uses the backend client).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod forms;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod routes;
pub mod state;
pub mod vendor_mode;
