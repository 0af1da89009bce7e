//! Caller profiles.
//!
//! The backend keeps two profile records per caller with the same shape: a
//! buyer profile used while shopping and a general user profile. They are
//! separate records and are never substituted for one another.

use serde::{Deserialize, Serialize};

/// Profile a buyer saves for themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub name: String,
}

/// General user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}
