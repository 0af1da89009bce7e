//! Form input validation.
//!
//! Forms are checked here before any backend call. Each error's `Display`
//! is the message rendered next to the form.

use serde::Deserialize;
use thiserror::Error;

use provision_store_core::{
    NewProduct, Price, PriceError, Principal, ProductCategory, ProductId, UserRole,
};

/// Characters of a principal shown in success messages.
pub const PRINCIPAL_PREVIEW_LEN: usize = 10;

/// A rejected form submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("You are not authorized to update prices")]
    PriceEditUnauthorized,

    #[error("Price cannot be empty")]
    PriceEmpty,

    #[error("Please enter a valid positive number")]
    PriceInvalid,

    #[error("All fields are required")]
    MissingFields,

    #[error("Please select a category")]
    MissingCategory,

    #[error("Product ID must be a positive number")]
    InvalidProductId,

    #[error("Price must be a positive number")]
    InvalidProductPrice,

    #[error("Principal ID is required")]
    PrincipalRequired,

    #[error("Invalid Principal ID format. Please check and try again.")]
    InvalidPrincipal,

    #[error("Please select a role")]
    InvalidRole,

    #[error("Name is required")]
    NameRequired,
}

/// Validate a price edit.
///
/// # Errors
///
/// Returns `FormError` when the caller may not edit prices or the input is
/// not a positive number.
pub fn parse_price_edit(input: &str, authorized: bool) -> Result<Price, FormError> {
    if !authorized {
        return Err(FormError::PriceEditUnauthorized);
    }
    Price::parse_input(input).map_err(|e| match e {
        PriceError::Empty => FormError::PriceEmpty,
        PriceError::NotANumber(_) | PriceError::NotPositive | PriceError::TooLarge => {
            FormError::PriceInvalid
        }
    })
}

/// Price edit form body.
#[derive(Debug, Deserialize)]
pub struct PriceEditForm {
    #[serde(default)]
    pub price: String,
}

/// Add product form body. Fields arrive as raw text.
#[derive(Debug, Default, Deserialize)]
pub struct NewProductForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category: String,
}

impl NewProductForm {
    /// Validate into a product ready for the backend.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in the order the form lists them.
    pub fn validate(&self) -> Result<NewProduct, FormError> {
        let id = self.id.trim();
        let name = self.name.trim();
        let price = self.price.trim();

        if id.is_empty() || name.is_empty() || price.is_empty() {
            return Err(FormError::MissingFields);
        }

        let category: ProductCategory = match self.category.trim() {
            "" => return Err(FormError::MissingCategory),
            other => other.parse().map_err(|_| FormError::MissingCategory)?,
        };

        let id = parse_leading_id(id)?;

        let price = Price::parse_input(price).map_err(|_| FormError::InvalidProductPrice)?;

        Ok(NewProduct {
            id,
            name: name.to_string(),
            price,
            category,
        })
    }
}

/// Read the integer an id field starts with, so "1.5" is product 1.
fn parse_leading_id(input: &str) -> Result<ProductId, FormError> {
    let unsigned = input.strip_prefix('+').unwrap_or(input);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = unsigned.get(..end).unwrap_or_default();

    match digits.parse::<u64>() {
        Ok(0) | Err(_) => Err(FormError::InvalidProductId),
        Ok(id) => Ok(ProductId::new(id)),
    }
}

/// Success message for an added product.
#[must_use]
pub fn product_added_message(name: &str) -> String {
    format!("Product \"{name}\" added successfully!")
}

/// Success message for a price update.
#[must_use]
pub fn price_updated_message(name: &str) -> String {
    format!("Price updated successfully for {name}")
}

/// Success message for granted vendor access.
#[must_use]
pub fn vendor_granted_message(principal: &Principal) -> String {
    format!(
        "Vendor access granted successfully to {}",
        principal.abbreviated(PRINCIPAL_PREVIEW_LEN)
    )
}

/// Success message for removed vendor access.
#[must_use]
pub fn vendor_removed_message(principal: &Principal) -> String {
    format!(
        "Vendor access removed successfully from {}",
        principal.abbreviated(PRINCIPAL_PREVIEW_LEN)
    )
}

/// Success message for an assigned role.
#[must_use]
pub fn role_assigned_message(principal: &Principal, role: UserRole) -> String {
    format!(
        "{} role assigned to {}",
        role.label(),
        principal.abbreviated(PRINCIPAL_PREVIEW_LEN)
    )
}

/// Principal form body (vendor access manager).
#[derive(Debug, Default, Deserialize)]
pub struct PrincipalForm {
    #[serde(default)]
    pub principal: String,
}

/// Validate a principal typed by an admin.
///
/// # Errors
///
/// Returns `FormError` when the input is blank or not a valid principal.
pub fn parse_principal_input(input: &str) -> Result<Principal, FormError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FormError::PrincipalRequired);
    }
    Principal::from_text(trimmed).map_err(|_| FormError::InvalidPrincipal)
}

/// Role assignment form body.
#[derive(Debug, Default, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub principal: String,
    #[serde(default)]
    pub role: String,
}

impl RoleForm {
    /// Validate into the target principal and role.
    ///
    /// # Errors
    ///
    /// Returns `FormError` when the principal is blank or malformed, or the
    /// role is not one of the known roles.
    pub fn validate(&self) -> Result<(Principal, UserRole), FormError> {
        let principal = parse_principal_input(&self.principal)?;
        let role = self
            .role
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidRole)?;
        Ok((principal, role))
    }
}

/// Profile form body.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
}

/// Validate a profile name, returning it trimmed.
///
/// # Errors
///
/// Returns `FormError::NameRequired` for a blank name.
pub fn validate_profile_name(input: &str) -> Result<String, FormError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FormError::NameRequired);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(id: &str, name: &str, price: &str, category: &str) -> NewProductForm {
        NewProductForm {
            id: id.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_price_edit() {
        assert_eq!(parse_price_edit("120", true), Ok(Price::new(120)));
        assert_eq!(parse_price_edit(" 99.5 ", true), Ok(Price::new(100)));
        assert_eq!(
            parse_price_edit("120", false),
            Err(FormError::PriceEditUnauthorized)
        );
        assert_eq!(parse_price_edit("  ", true), Err(FormError::PriceEmpty));
        for bad in ["abc", "-5", "0", "0.3"] {
            assert_eq!(parse_price_edit(bad, true), Err(FormError::PriceInvalid));
        }
    }

    #[test]
    fn test_new_product_valid() {
        let product = form("7", "  Toor Dal ", "139.6", "groceries")
            .validate()
            .unwrap();
        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.name, "Toor Dal");
        assert_eq!(product.price, Price::new(140));
        assert_eq!(product.category, ProductCategory::Groceries);
    }

    #[test]
    fn test_product_id_takes_leading_integer() {
        let id = |input: &str| form(input, "Rice", "10", "groceries").validate().map(|p| p.id);

        assert_eq!(id("1.5"), Ok(ProductId::new(1)));
        assert_eq!(id("12abc"), Ok(ProductId::new(12)));
        assert_eq!(id(" +8 "), Ok(ProductId::new(8)));
        assert_eq!(id("0.9"), Err(FormError::InvalidProductId));
        assert_eq!(id(".5"), Err(FormError::InvalidProductId));
        assert_eq!(id("-3"), Err(FormError::InvalidProductId));
    }

    #[test]
    fn test_new_product_check_order() {
        assert_eq!(
            form("", "Rice", "10", "").validate(),
            Err(FormError::MissingFields)
        );
        assert_eq!(
            form("1", "Rice", "10", "").validate(),
            Err(FormError::MissingCategory)
        );
        assert_eq!(
            form("0", "Rice", "10", "groceries").validate(),
            Err(FormError::InvalidProductId)
        );
        assert_eq!(
            form("x", "Rice", "10", "groceries").validate(),
            Err(FormError::InvalidProductId)
        );
        assert_eq!(
            form("1", "Rice", "-10", "groceries").validate(),
            Err(FormError::InvalidProductPrice)
        );
    }

    #[test]
    fn test_form_error_messages() {
        assert_eq!(FormError::MissingFields.to_string(), "All fields are required");
        assert_eq!(
            FormError::InvalidPrincipal.to_string(),
            "Invalid Principal ID format. Please check and try again."
        );
        assert_eq!(
            product_added_message("Toor Dal"),
            "Product \"Toor Dal\" added successfully!"
        );
    }

    #[test]
    fn test_principal_input() {
        assert_eq!(
            parse_principal_input("  "),
            Err(FormError::PrincipalRequired)
        );
        assert_eq!(
            parse_principal_input("NOT-A-PRINCIPAL"),
            Err(FormError::InvalidPrincipal)
        );
        let principal = parse_principal_input(" rrkah-fqaaa-aaaaa-aaaaq-cai ").unwrap();
        assert_eq!(
            principal.abbreviated(PRINCIPAL_PREVIEW_LEN),
            "rrkah-fqaa..."
        );
    }

    #[test]
    fn test_success_messages_abbreviate_principal() {
        let principal = Principal::from_text("rrkah-fqaaa-aaaaa-aaaaq-cai").unwrap();
        assert_eq!(
            vendor_granted_message(&principal),
            "Vendor access granted successfully to rrkah-fqaa..."
        );
        assert_eq!(
            vendor_removed_message(&principal),
            "Vendor access removed successfully from rrkah-fqaa..."
        );
        assert_eq!(
            price_updated_message("Toor Dal"),
            "Price updated successfully for Toor Dal"
        );
    }

    #[test]
    fn test_role_form() {
        let form = RoleForm {
            principal: "aaaaa-aa".to_string(),
            role: "admin".to_string(),
        };
        let (principal, role) = form.validate().unwrap();
        assert_eq!(principal.as_str(), "aaaaa-aa");
        assert_eq!(role, UserRole::Admin);

        let bad_role = RoleForm {
            principal: "aaaaa-aa".to_string(),
            role: "owner".to_string(),
        };
        assert_eq!(bad_role.validate(), Err(FormError::InvalidRole));
    }

    #[test]
    fn test_profile_name() {
        assert_eq!(validate_profile_name(" Asha "), Ok("Asha".to_string()));
        assert_eq!(validate_profile_name(""), Err(FormError::NameRequired));
    }
}
