//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use provision_store_core::{PRODUCT_CATEGORIES, Product, ProductCategory};

use crate::middleware::{CurrentVendorMode, OptionalIdentity};
use crate::routes::PageContext;
use crate::state::AppState;

/// One "shop by category" tile.
#[derive(Debug, Clone)]
pub struct CategoryTile {
    pub category: ProductCategory,
    pub count: usize,
    pub selected: bool,
}

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub category: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryTile>,
    pub deals: Vec<Product>,
    pub selected: Option<ProductCategory>,
    pub error: Option<String>,
}

/// Build the category tiles with product counts.
#[must_use]
pub fn category_tiles(products: &[Product], selected: Option<ProductCategory>) -> Vec<CategoryTile> {
    PRODUCT_CATEGORIES
        .into_iter()
        .map(|category| CategoryTile {
            category,
            count: products.iter().filter(|p| p.category == category).count(),
            selected: selected == Some(category),
        })
        .collect()
}

/// Display the home page.
#[instrument(skip(state, session, vendor_mode, identity))]
pub async fn home(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    CurrentVendorMode(vendor_mode): CurrentVendorMode,
    session: Session,
    Query(query): Query<HomeQuery>,
) -> HomeTemplate {
    let actor = state.actor(identity);
    let page = PageContext::load(&state, &actor, vendor_mode, &session).await;

    let selected = query
        .category
        .as_deref()
        .and_then(|c| c.parse::<ProductCategory>().ok());

    let products = state.queries().all_products(&actor).await;
    let error = products.error_message();
    let products = products.into_data().unwrap_or_default();

    let categories = category_tiles(&products, selected);
    let deals = products
        .into_iter()
        .filter(|p| selected.is_none_or(|c| p.category == c))
        .collect();

    HomeTemplate {
        page,
        categories,
        deals,
        selected,
        error,
    }
}
