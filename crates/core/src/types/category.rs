//! Product categories.
//!
//! The backend knows exactly seven categories. Their wire identifiers are
//! part of the backend interface and must not change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a category identifier is not one of the known tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product category: {0}")]
pub struct CategoryParseError(pub String);

/// The closed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductCategory {
    Groceries,
    Snacks,
    HouseholdToiletries,
    Fruits,
    Spices,
    Beverages,
    Vegetables,
}

/// Categories in the order they are shown to shoppers.
pub const PRODUCT_CATEGORIES: [ProductCategory; 7] = [
    ProductCategory::Fruits,
    ProductCategory::Vegetables,
    ProductCategory::Spices,
    ProductCategory::Groceries,
    ProductCategory::Snacks,
    ProductCategory::Beverages,
    ProductCategory::HouseholdToiletries,
];

impl ProductCategory {
    /// Stable wire identifier, as the backend spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "groceries",
            Self::Snacks => "snacks",
            Self::HouseholdToiletries => "householdToiletries",
            Self::Fruits => "fruits",
            Self::Spices => "spices",
            Self::Beverages => "beverages",
            Self::Vegetables => "vegetables",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Groceries => "Groceries",
            Self::Snacks => "Snacks",
            Self::HouseholdToiletries => "Household/Toiletries",
            Self::Fruits => "Fruits",
            Self::Spices => "Spices",
            Self::Beverages => "Beverages",
            Self::Vegetables => "Vegetables",
        }
    }

    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Groceries => "🌾",
            Self::Snacks => "🍪",
            Self::HouseholdToiletries => "🧴",
            Self::Fruits => "🍎",
            Self::Spices => "🌶️",
            Self::Beverages => "☕",
            Self::Vegetables => "🥬",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Groceries => "Essential groceries",
            Self::Snacks => "Snacks and treats",
            Self::HouseholdToiletries => "Household and personal care",
            Self::Fruits => "Fresh fruits",
            Self::Spices => "Spices and seasonings",
            Self::Beverages => "Drinks and beverages",
            Self::Vegetables => "Fresh vegetables",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PRODUCT_CATEGORIES
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}
