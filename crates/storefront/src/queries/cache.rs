//! Cache types for backend reads.

use provision_store_core::{BuyerProfile, Principal, Product, ProductId, UserProfile, UserRole};

/// Cache key for one backend read.
///
/// Caller-scoped reads carry the caller so one cache can serve every
/// session without handing one caller's data to another.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum QueryKey {
    Products,
    Product(ProductId),
    CallerUserRole(Principal),
    IsCallerAdmin(Principal),
    CallerBuyerProfile(Principal),
    CallerUserProfile(Principal),
    UserProfile { caller: Principal, target: Principal },
    BuyerProfile { caller: Principal, target: Principal },
}

impl QueryKey {
    /// Short name for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Product(_) => "product",
            Self::CallerUserRole(_) => "callerUserRole",
            Self::IsCallerAdmin(_) => "isCallerAdmin",
            Self::CallerBuyerProfile(_) => "callerBuyerProfile",
            Self::CallerUserProfile(_) => "callerUserProfile",
            Self::UserProfile { .. } => "userProfile",
            Self::BuyerProfile { .. } => "buyerProfile",
        }
    }

    /// The caller this entry was fetched for, if it is caller-scoped.
    #[must_use]
    pub const fn caller(&self) -> Option<&Principal> {
        match self {
            Self::Products | Self::Product(_) => None,
            Self::CallerUserRole(caller)
            | Self::IsCallerAdmin(caller)
            | Self::CallerBuyerProfile(caller)
            | Self::CallerUserProfile(caller)
            | Self::UserProfile { caller, .. }
            | Self::BuyerProfile { caller, .. } => Some(caller),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Option<Product>),
    Role(UserRole),
    Flag(bool),
    BuyerProfile(Option<BuyerProfile>),
    UserProfile(Option<UserProfile>),
}
