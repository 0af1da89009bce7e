//! Admin route handlers: vendor access, role assignment and user lookup.
//!
//! The pages render for admins only; the backend independently rejects
//! role changes from anyone else.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use provision_store_core::{BuyerProfile, Principal, UserProfile, UserRole};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::forms::{
    FormError, PrincipalForm, RoleForm, parse_principal_input, role_assigned_message,
    vendor_granted_message, vendor_removed_message,
};
use crate::middleware::{CurrentVendorMode, RequireIdentity};
use crate::queries::MutationError;
use crate::routes::PageContext;
use crate::state::AppState;
use crate::vendor_mode::VendorMode;

/// Roles offered by the role assignment form.
const ASSIGNABLE_ROLES: [UserRole; 3] = [UserRole::Admin, UserRole::User, UserRole::Guest];

/// Vendor access manager template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/vendors.html")]
pub struct VendorsTemplate {
    pub page: PageContext,
    pub roles: Vec<UserRole>,
    pub principal_input: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// User inspection template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/user.html")]
pub struct UserTemplate {
    pub page: PageContext,
    pub target: Principal,
    pub user_profile: Option<UserProfile>,
    pub buyer_profile: Option<BuyerProfile>,
    pub error: Option<String>,
}

/// Why an admin form did not go through.
enum AdminFailure {
    Form(FormError),
    Backend(MutationError),
}

impl AdminFailure {
    fn message(&self) -> String {
        match self {
            Self::Form(e) => e.to_string(),
            Self::Backend(e) => e.message().to_string(),
        }
    }
}

fn vendors_page(page: PageContext) -> VendorsTemplate {
    VendorsTemplate {
        page,
        roles: ASSIGNABLE_ROLES.to_vec(),
        principal_input: String::new(),
        error: None,
        success: None,
    }
}

/// Render the vendor manager after a form submission.
async fn respond(
    state: &AppState,
    principal: Principal,
    vendor_mode: VendorMode,
    session: &Session,
    input: String,
    outcome: std::result::Result<String, AdminFailure>,
) -> Response {
    let actor = state.actor(Some(principal));
    let page = PageContext::load(state, &actor, vendor_mode, session).await;
    let mut template = vendors_page(page);

    match outcome {
        Ok(success) => {
            template.success = Some(success);
            template.into_response()
        }
        Err(failure) => {
            template.error = Some(failure.message());
            template.principal_input = input;
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}

/// Display the vendor access manager.
#[instrument(skip(state, session, vendor_mode), fields(caller = %principal))]
pub async fn vendors(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
) -> Response {
    let actor = state.actor(Some(principal));
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;
    let is_admin = page.access.is_admin;
    let template = vendors_page(page);

    if is_admin {
        template.into_response()
    } else {
        (StatusCode::FORBIDDEN, template).into_response()
    }
}

/// Grant vendor access.
#[instrument(skip(state, session, vendor_mode, form), fields(caller = %principal))]
pub async fn assign_vendor(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Form(form): Form<PrincipalForm>,
) -> Response {
    let actor = state.actor(Some(principal.clone()));
    let outcome = match parse_principal_input(&form.principal) {
        Ok(target) => state
            .queries()
            .assign_vendor(&actor, &target)
            .await
            .map(|()| {
                add_breadcrumb("admin", "Granted vendor access", None);
                vendor_granted_message(&target)
            })
            .map_err(AdminFailure::Backend),
        Err(e) => Err(AdminFailure::Form(e)),
    };

    respond(&state, principal, vendor_mode, &session, form.principal, outcome).await
}

/// Revoke vendor access.
#[instrument(skip(state, session, vendor_mode, form), fields(caller = %principal))]
pub async fn remove_vendor(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Form(form): Form<PrincipalForm>,
) -> Response {
    let actor = state.actor(Some(principal.clone()));
    let outcome = match parse_principal_input(&form.principal) {
        Ok(target) => state
            .queries()
            .remove_vendor(&actor, &target)
            .await
            .map(|()| {
                add_breadcrumb("admin", "Removed vendor access", None);
                vendor_removed_message(&target)
            })
            .map_err(AdminFailure::Backend),
        Err(e) => Err(AdminFailure::Form(e)),
    };

    respond(&state, principal, vendor_mode, &session, form.principal, outcome).await
}

/// Assign a role.
#[instrument(skip(state, session, vendor_mode, form), fields(caller = %principal))]
pub async fn assign_role(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Form(form): Form<RoleForm>,
) -> Response {
    let actor = state.actor(Some(principal.clone()));
    let outcome = match form.validate() {
        Ok((target, role)) => state
            .queries()
            .assign_role(&actor, &target, role)
            .await
            .map(|()| role_assigned_message(&target, role))
            .map_err(AdminFailure::Backend),
        Err(e) => Err(AdminFailure::Form(e)),
    };

    respond(&state, principal, vendor_mode, &session, form.principal, outcome).await
}

/// Look up a user by principal and go to their page.
#[instrument(skip_all)]
pub async fn lookup(
    RequireIdentity(_principal): RequireIdentity,
    Query(form): Query<PrincipalForm>,
) -> Result<Redirect> {
    let target = parse_principal_input(&form.principal)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Redirect::to(&format!("/admin/users/{target}")))
}

/// Show a user's profiles.
///
/// Both profile reads go through the caller's actor, so the backend decides
/// who may see them.
#[instrument(skip(state, session, vendor_mode, target), fields(caller = %principal, user = %target))]
pub async fn user(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Path(target): Path<String>,
) -> Result<UserTemplate> {
    let target = parse_principal_input(&target)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let actor = state.actor(Some(principal));
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;

    let user_profile = state.queries().user_profile(&actor, &target).await;
    let buyer_profile = state.queries().buyer_profile(&actor, &target).await;
    let error = user_profile
        .error_message()
        .or_else(|| buyer_profile.error_message());

    Ok(UserTemplate {
        page,
        target,
        user_profile: user_profile.into_data().flatten(),
        buyer_profile: buyer_profile.into_data().flatten(),
        error,
    })
}
