//! Product Routes
//!
//! Products are private to their owner; other users' products are
//! reported as missing.
//!
//! Routes:
//! - GET /products - The caller's products
//! - POST /products - Log a purchase
//! - GET /products/:id - Get one of the caller's products
//! - PUT /products/:id - Overwrite one of the caller's products
//! - DELETE /products/:id - Remove one of the caller's products

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use freshsaver_models::{now_millis, NewProduct, Product};

use super::{created, ensure_type_visible, validate_title, CreatedResponse};
use crate::identity::Caller;
use crate::{AppState, Error, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A product with its freshness as of the time of the request.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// Whole days until expiry
    pub days_left: i64,
    pub expired: bool,
}

impl ProductView {
    pub fn at(product: Product, now: i64) -> Self {
        Self {
            days_left: product.days_left(now),
            expired: !product.is_active_at(now),
            product,
        }
    }

    pub fn render(products: impl IntoIterator<Item = Product>) -> Vec<Self> {
        let now = now_millis();
        products.into_iter().map(|p| Self::at(p, now)).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub product_type_id: String,
    pub purchase_date: i64,
    pub expiration_date: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

fn validate_optional_title(title: Option<&str>) -> Result<()> {
    match title {
        Some(title) => validate_title(title),
        None => Ok(()),
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[axum::debug_handler]
async fn list_products(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<ProductView>>> {
    let user_id = caller.user_id().ok_or(Error::Unauthenticated)?;
    let products = state.inventory_for(&caller).list_products(user_id).await?;
    Ok(Json(ProductView::render(products)))
}

/// Log a purchase.
///
/// POST /products
///
/// Without `expiration_date` the product type's shelf life is applied.
/// Returns 409 when neither is available.
#[axum::debug_handler]
async fn create_product(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<NewProduct>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    caller.user_id().ok_or(Error::Unauthenticated)?;
    validate_optional_title(request.title.as_deref())?;
    ensure_type_visible(&state, &caller, &request.product_type_id).await?;

    let id = state.inventory_for(&caller).create_product(request).await?;
    Ok(created(id))
}

#[axum::debug_handler]
async fn get_product(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let product = owned_product(&state, &caller, &id).await?;
    Ok(Json(ProductView::at(product, now_millis())))
}

#[axum::debug_handler]
async fn update_product(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductView>> {
    validate_optional_title(request.title.as_deref())?;

    let existing = owned_product(&state, &caller, &id).await?;
    if request.product_type_id != existing.product_type_id {
        ensure_type_visible(&state, &caller, &request.product_type_id).await?;
    }

    let product = Product {
        product_type_id: request.product_type_id,
        purchase_date: request.purchase_date,
        expiration_date: request.expiration_date,
        title: request.title,
        cost: request.cost,
        ..existing
    };
    state.inventory_for(&caller).update_product(&product).await?;

    Ok(Json(ProductView::at(product, now_millis())))
}

#[axum::debug_handler]
async fn delete_product(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    owned_product(&state, &caller, &id).await?;
    state.inventory_for(&caller).delete_product(&id).await?;

    Ok(Json(json!({
        "deleted": true,
        "id": id
    })))
}

async fn owned_product(state: &AppState, caller: &Caller, id: &str) -> Result<Product> {
    let user_id = caller.user_id().ok_or(Error::Unauthenticated)?;
    let product = state.inventory.get_product(id).await?;
    if product.user_id != user_id {
        return Err(Error::NotFound(format!("Product not found: {}", id)));
    }
    Ok(product)
}
