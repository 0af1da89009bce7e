//! Vendor access, role and identity commands.

use provision_store_core::{Principal, RoleLookup, UserRole, derive_access};
use provision_store_storefront::backend::Actor;

use super::CommandError;

/// Grant vendor access to `principal`.
///
/// # Errors
///
/// Returns `CommandError` if the caller is not an admin or the call fails.
pub async fn assign_vendor(actor: &Actor, principal: &Principal) -> Result<(), CommandError> {
    actor.backend().assign_vendor(principal).await?;
    tracing::info!("Vendor access granted to {principal}");
    Ok(())
}

/// Revoke vendor access from `principal`.
///
/// # Errors
///
/// Returns `CommandError` if the caller is not an admin or the call fails.
pub async fn remove_vendor(actor: &Actor, principal: &Principal) -> Result<(), CommandError> {
    actor.backend().remove_vendor(principal).await?;
    tracing::info!("Vendor access removed from {principal}");
    Ok(())
}

/// Assign `role` to `principal`.
///
/// # Errors
///
/// Returns `CommandError` if the caller is not an admin or the call fails.
pub async fn assign_role(
    actor: &Actor,
    principal: &Principal,
    role: UserRole,
) -> Result<(), CommandError> {
    actor
        .backend()
        .assign_caller_user_role(principal, role)
        .await?;
    tracing::info!("{} role assigned to {principal}", role.label());
    Ok(())
}

/// Show the caller's role and what it may do.
///
/// # Errors
///
/// Returns `CommandError` if the role lookup fails.
pub async fn whoami(actor: &Actor) -> Result<(), CommandError> {
    let Some(caller) = actor.caller() else {
        tracing::info!("Anonymous caller (pass --caller or set STORE_CALLER)");
        return Ok(());
    };

    let role = actor.backend().get_caller_user_role().await?;
    let is_admin = actor.backend().is_caller_admin().await?;
    let access = derive_access(true, false, RoleLookup::Resolved(role));

    tracing::info!("Principal: {caller}");
    tracing::info!("Role:      {}", role.label());
    tracing::info!("Admin:     {is_admin}");
    tracing::info!("Vendor:    {}", access.is_vendor);
    tracing::info!("Can manage products: {}", access.is_authorized);
    Ok(())
}
