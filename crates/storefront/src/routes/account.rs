//! Account route handlers.
//!
//! These routes require a signed-in caller. The buyer profile and the user
//! profile are separate backend records with separate forms.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use provision_store_core::{BuyerProfile, UserProfile};

use crate::backend::Actor;
use crate::forms::{ProfileForm, validate_profile_name};
use crate::middleware::{CurrentVendorMode, RequireIdentity};
use crate::routes::PageContext;
use crate::state::AppState;
use crate::vendor_mode::VendorMode;

/// Which profile form a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Buyer,
    User,
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub buyer_profile: Option<BuyerProfile>,
    pub user_profile: Option<UserProfile>,
    /// Form the messages below refer to.
    pub form: Option<ProfileKind>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl AccountTemplate {
    /// Whether the messages belong to the buyer profile form.
    #[must_use]
    pub fn for_buyer(&self) -> bool {
        self.form == Some(ProfileKind::Buyer)
    }

    /// Whether the messages belong to the user profile form.
    #[must_use]
    pub fn for_user(&self) -> bool {
        self.form == Some(ProfileKind::User)
    }
}

async fn account_page(state: &AppState, actor: &Actor, page: PageContext) -> AccountTemplate {
    let buyer = state.queries().caller_buyer_profile(actor).await;
    let user = state.queries().caller_user_profile(actor).await;
    let error = buyer.error_message().or_else(|| user.error_message());

    AccountTemplate {
        page,
        buyer_profile: buyer.into_data().flatten(),
        user_profile: user.into_data().flatten(),
        form: None,
        error,
        success: None,
    }
}

/// Display the caller's profiles.
#[instrument(skip(state, session, vendor_mode), fields(caller = %principal))]
pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
) -> AccountTemplate {
    let actor = state.actor(Some(principal));
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;
    account_page(&state, &actor, page).await
}

/// Save the caller's buyer profile.
#[instrument(skip(state, session, vendor_mode, form), fields(caller = %principal))]
pub async fn save_buyer_profile(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    let actor = state.actor(Some(principal));
    let outcome = match validate_profile_name(&form.name) {
        Ok(name) => state
            .queries()
            .save_buyer_profile(&actor, &BuyerProfile { name })
            .await
            .map_err(|e| e.message().to_string()),
        Err(e) => Err(e.to_string()),
    };

    respond(&state, &actor, vendor_mode, &session, ProfileKind::Buyer, outcome).await
}

/// Save the caller's user profile.
#[instrument(skip(state, session, vendor_mode, form), fields(caller = %principal))]
pub async fn save_user_profile(
    State(state): State<AppState>,
    RequireIdentity(principal): RequireIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    let actor = state.actor(Some(principal));
    let outcome = match validate_profile_name(&form.name) {
        Ok(name) => state
            .queries()
            .save_user_profile(&actor, &UserProfile { name })
            .await
            .map_err(|e| e.message().to_string()),
        Err(e) => Err(e.to_string()),
    };

    respond(&state, &actor, vendor_mode, &session, ProfileKind::User, outcome).await
}

async fn respond(
    state: &AppState,
    actor: &Actor,
    vendor_mode: VendorMode,
    session: &Session,
    kind: ProfileKind,
    outcome: Result<(), String>,
) -> Response {
    let page = PageContext::load(state, actor, vendor_mode, session).await;
    let mut template = account_page(state, actor, page).await;
    template.form = Some(kind);

    match outcome {
        Ok(()) => {
            template.success = Some("Profile saved".to_string());
            template.into_response()
        }
        Err(message) => {
            template.error = Some(message);
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}
