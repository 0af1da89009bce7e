//! Product records as the backend returns them.

use serde::{Deserialize, Serialize};

use super::{Price, ProductCategory, ProductId};

/// A product listed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Vendor-assigned id. Immutable once created.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    pub category: ProductCategory,
    pub price: Price,
}

/// A product a vendor is about to add.
///
/// Same shape as [`Product`]; kept separate so a validated form can't be
/// mistaken for a record that already exists in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: ProductCategory,
}

impl From<NewProduct> for Product {
    fn from(new: NewProduct) -> Self {
        Self {
            id: new.id,
            name: new.name,
            category: new.category,
            price: new.price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_shape() {
        let json = serde_json::json!({
            "id": 7,
            "name": "Toor Dal",
            "category": "groceries",
            "price": 140
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.category, ProductCategory::Groceries);
        assert_eq!(product.price, Price::new(140));
    }
}
