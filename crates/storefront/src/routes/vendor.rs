//! Vendor route handlers.
//!
//! Vendor screens render only in vendor mode. Vendor mode is a display
//! switch; the backend decides whether a caller may add products or change
//! prices, and its rejections are shown inline.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use provision_store_core::{PRODUCT_CATEGORIES, Product, ProductCategory, ProductId};

use crate::backend::Actor;
use crate::error::{Result, add_breadcrumb};
use crate::forms::{
    NewProductForm, PriceEditForm, parse_price_edit, price_updated_message,
    product_added_message,
};
use crate::middleware::{CurrentVendorMode, OptionalIdentity, set_vendor_mode};
use crate::routes::PageContext;
use crate::state::AppState;

/// Vendor dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub categories: Vec<ProductCategory>,
    pub form: NewProductForm,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Daily deals price editor template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/prices.html")]
pub struct PriceEditorTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
    pub error: Option<String>,
    pub success: Option<String>,
}

fn dashboard_page(page: PageContext) -> DashboardTemplate {
    DashboardTemplate {
        page,
        categories: PRODUCT_CATEGORIES.to_vec(),
        form: NewProductForm::default(),
        error: None,
        success: None,
    }
}

async fn price_editor_page(state: &AppState, actor: &Actor, page: PageContext) -> PriceEditorTemplate {
    let products = state.queries().all_products(actor).await;
    PriceEditorTemplate {
        page,
        error: products.error_message(),
        products: products.into_data().unwrap_or_default(),
        success: None,
    }
}

/// Display the vendor dashboard.
#[instrument(skip(state, session, vendor_mode, identity))]
pub async fn dashboard(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
) -> DashboardTemplate {
    let actor = state.actor(identity);
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;
    dashboard_page(page)
}

/// Add a product.
///
/// Validation and backend failures re-render the form with the message and
/// the submitted values.
#[instrument(skip(state, session, vendor_mode, identity, form))]
pub async fn add_product(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Form(form): Form<NewProductForm>,
) -> Response {
    let actor = state.actor(identity);

    let outcome = match form.validate() {
        Ok(product) => state
            .queries()
            .add_product(&actor, &product)
            .await
            .map(|()| product)
            .map_err(|e| e.message().to_string()),
        Err(e) => Err(e.to_string()),
    };

    // Load after the mutation so the header reflects fresh data.
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;
    let mut template = dashboard_page(page);

    match outcome {
        Ok(product) => {
            let product_id = product.id.to_string();
            add_breadcrumb(
                "vendor",
                "Added product",
                Some(&[("product_id", product_id.as_str())]),
            );
            template.success = Some(product_added_message(&product.name));
            template.into_response()
        }
        Err(message) => {
            template.form = form;
            template.error = Some(message);
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}

/// Display the price editor.
#[instrument(skip(state, session, vendor_mode, identity))]
pub async fn price_editor(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
) -> PriceEditorTemplate {
    let actor = state.actor(identity);
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;
    price_editor_page(&state, &actor, page).await
}

/// Update one product's price.
#[instrument(skip(state, session, vendor_mode, identity, form), fields(product_id = %id))]
pub async fn update_price(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<PriceEditForm>,
) -> Response {
    let actor = state.actor(identity);
    let access = state.queries().access(&actor).await;

    let outcome = match parse_price_edit(&form.price, access.is_authorized) {
        Ok(price) => state
            .queries()
            .update_product_price(&actor, id, price)
            .await
            .map_err(|e| e.message().to_string()),
        Err(e) => Err(e.to_string()),
    };

    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;
    let mut template = price_editor_page(&state, &actor, page).await;

    match outcome {
        Ok(()) => {
            let name = template
                .products
                .iter()
                .find(|p| p.id == id)
                .map_or_else(|| format!("product {id}"), |p| p.name.clone());
            template.success = Some(price_updated_message(&name));
            template.into_response()
        }
        Err(message) => {
            template.error = Some(message);
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}

/// Turn vendor mode on and go to the dashboard.
pub async fn enable_mode(session: Session) -> Result<Redirect> {
    let mode = set_vendor_mode(&session, true).await?;
    tracing::debug!(enabled = mode.is_enabled(), "Vendor mode changed");
    Ok(Redirect::to("/vendor"))
}

/// Turn vendor mode off and go home.
pub async fn disable_mode(session: Session) -> Result<Redirect> {
    let mode = set_vendor_mode(&session, false).await?;
    tracing::debug!(enabled = mode.is_enabled(), "Vendor mode changed");
    Ok(Redirect::to("/"))
}
