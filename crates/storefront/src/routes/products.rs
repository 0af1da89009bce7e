//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use provision_store_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::{CurrentVendorMode, OptionalIdentity};
use crate::queries::QueryState;
use crate::routes::PageContext;
use crate::state::AppState;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: Option<Product>,
    pub error: Option<String>,
}

/// Display a product.
///
/// A read failure renders the page with an inline alert; a product the
/// backend does not know is a 404.
#[instrument(skip(state, session, vendor_mode, identity), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<ProductTemplate> {
    let actor = state.actor(identity);
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;

    match state.queries().product(&actor, id).await {
        QueryState::Loaded(Some(product)) => Ok(ProductTemplate {
            page,
            product: Some(product),
            error: None,
        }),
        QueryState::Loaded(None) | QueryState::Disabled => {
            Err(AppError::NotFound(format!("product {id}")))
        }
        failed @ QueryState::Failed(_) => Ok(ProductTemplate {
            page,
            product: None,
            error: failed.error_message(),
        }),
    }
}
