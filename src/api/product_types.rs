//! Product Type Routes
//!
//! Routes:
//! - POST /product-types - Create a product type owned by the caller
//! - GET /product-types/:id - Get a visible product type
//! - PUT /product-types/:id - Update an owned product type
//! - DELETE /product-types/:id - Delete an owned product type and its products
//! - GET /product-types/:id/products - The caller's products of this type

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use freshsaver_models::{is_visible, NewProductType, ProductType};

use super::products::ProductView;
use super::{created, ensure_owner, validate_title, CreatedResponse};
use crate::identity::Caller;
use crate::{AppState, Error, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product_type))
        .route(
            "/:id",
            get(get_product_type)
                .put(update_product_type)
                .delete(delete_product_type),
        )
        .route("/:id/products", get(list_products))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductTypeRequest {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub time_to_expire: Option<i64>,
}

fn validate_shelf_life(time_to_expire: Option<i64>) -> Result<()> {
    match time_to_expire {
        Some(minutes) if minutes < 0 => Err(Error::InvalidInput(
            "time_to_expire must not be negative".into(),
        )),
        _ => Ok(()),
    }
}

/// Create a product type.
///
/// POST /product-types
///
/// The parent category must be visible to the caller.
#[axum::debug_handler]
async fn create_product_type(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<NewProductType>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    validate_title(&request.title)?;
    validate_shelf_life(request.time_to_expire)?;

    let inventory = state.inventory_for(&caller);
    let category = inventory.get_category(&request.category_id).await?;
    if !is_visible(&category.user_id, caller.user_id()) {
        return Err(Error::NotFound(format!(
            "Category not found: {}",
            request.category_id
        )));
    }

    let id = inventory.create_product_type(request).await?;
    Ok(created(id))
}

#[axum::debug_handler]
async fn get_product_type(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ProductType>> {
    Ok(Json(visible_product_type(&state, &caller, &id).await?))
}

#[axum::debug_handler]
async fn update_product_type(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductTypeRequest>,
) -> Result<Json<ProductType>> {
    validate_title(&request.title)?;
    validate_shelf_life(request.time_to_expire)?;

    let existing = visible_product_type(&state, &caller, &id).await?;
    ensure_owner(&caller, &existing.user_id, "Product type")?;

    let product_type = ProductType {
        title: request.title,
        image_url: request.image_url,
        time_to_expire: request.time_to_expire,
        ..existing
    };
    state
        .inventory_for(&caller)
        .set_product_type(&product_type)
        .await?;

    Ok(Json(product_type))
}

#[axum::debug_handler]
async fn delete_product_type(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let existing = visible_product_type(&state, &caller, &id).await?;
    ensure_owner(&caller, &existing.user_id, "Product type")?;

    state.inventory_for(&caller).delete_product_type(&id).await?;

    Ok(Json(json!({
        "deleted": true,
        "id": id
    })))
}

/// Products of one type, limited to those the caller owns.
#[axum::debug_handler]
async fn list_products(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductView>>> {
    visible_product_type(&state, &caller, &id).await?;

    let Some(user_id) = caller.user_id() else {
        return Ok(Json(Vec::new()));
    };

    let products = state
        .inventory_for(&caller)
        .list_products_by_type(&id)
        .await?;

    Ok(Json(ProductView::render(
        products.into_iter().filter(|p| p.user_id == user_id),
    )))
}

async fn visible_product_type(
    state: &AppState,
    caller: &Caller,
    id: &str,
) -> Result<ProductType> {
    let product_type = state.inventory.get_product_type(id).await?;
    if !is_visible(&product_type.user_id, caller.user_id()) {
        return Err(Error::NotFound(format!("Product type not found: {}", id)));
    }
    Ok(product_type)
}
