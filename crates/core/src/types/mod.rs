//! Core types for Provision Store.
//!
//! This module provides type-safe wrappers for the store's domain concepts.

pub mod category;
pub mod id;
pub mod price;
pub mod principal;
pub mod product;
pub mod profile;
pub mod role;

pub use category::{CategoryParseError, PRODUCT_CATEGORIES, ProductCategory};
pub use id::*;
pub use price::{Price, PriceError};
pub use principal::{Principal, PrincipalError};
pub use product::{NewProduct, Product};
pub use profile::{BuyerProfile, UserProfile};
pub use role::{RoleParseError, UserRole};
