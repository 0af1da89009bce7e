//! Product commands.
//!
//! # Usage
//!
//! ```bash
//! ps-cli products list
//! ps-cli products show 7
//! ps-cli --caller <principal> products add 7 "Basmati Rice" 120 groceries
//! ps-cli --caller <principal> products set-price 7 115
//! ```

use provision_store_core::{NewProduct, Price, ProductCategory, ProductId};
use provision_store_storefront::backend::Actor;

use super::CommandError;

/// List every product.
///
/// # Errors
///
/// Returns `CommandError` if the backend call fails.
pub async fn list(actor: &Actor) -> Result<(), CommandError> {
    let products = actor.backend().get_all_products().await?;

    if products.is_empty() {
        tracing::info!("No products");
        return Ok(());
    }

    for product in &products {
        tracing::info!(
            "{:>6}  {:<30} {:>8}  {}",
            product.id,
            product.name,
            product.price,
            product.category.label()
        );
    }
    tracing::info!("{} products", products.len());
    Ok(())
}

/// Show one product.
///
/// # Errors
///
/// Returns `CommandError` if the backend call fails or the product does not
/// exist.
pub async fn show(actor: &Actor, id: ProductId) -> Result<(), CommandError> {
    let product = actor
        .backend()
        .get_product(id)
        .await?
        .ok_or(CommandError::ProductNotFound(id))?;

    tracing::info!(
        "{} ({}): {} in {}",
        product.name,
        product.id,
        product.price,
        product.category.label()
    );
    Ok(())
}

/// Add a product.
///
/// # Errors
///
/// Returns `CommandError` if the backend rejects the product.
pub async fn add(
    actor: &Actor,
    id: ProductId,
    name: String,
    price: Price,
    category: ProductCategory,
) -> Result<(), CommandError> {
    let product = NewProduct {
        id,
        name,
        price,
        category,
    };

    actor.backend().add_product(&product).await?;

    tracing::info!("Product \"{}\" added successfully", product.name);
    Ok(())
}

/// Change a product's price.
///
/// # Errors
///
/// Returns `CommandError` if the backend rejects the update.
pub async fn set_price(actor: &Actor, id: ProductId, price: Price) -> Result<(), CommandError> {
    actor.backend().update_product_price(id, price).await?;

    tracing::info!("Price for product {id} set to {price}");
    Ok(())
}
