//! Category Routes
//!
//! Routes:
//! - GET /categories - Categories visible to the caller
//! - POST /categories - Create a category owned by the caller
//! - GET /categories/:id - Get a visible category
//! - PUT /categories/:id - Update an owned category
//! - DELETE /categories/:id - Delete an owned category and everything under it
//! - GET /categories/:id/product-types - Product types of a category

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use freshsaver_models::{is_visible, Category, NewCategory, ProductType};

use super::{created, ensure_owner, validate_title, CreatedResponse};
use crate::identity::Caller;
use crate::{AppState, Error, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/:id/product-types", get(list_product_types))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[axum::debug_handler]
async fn list_categories(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Category>>> {
    let categories = state
        .inventory_for(&caller)
        .list_categories(caller.user_id())
        .await?;
    Ok(Json(categories))
}

#[axum::debug_handler]
async fn create_category(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<NewCategory>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    validate_title(&request.title)?;
    let id = state.inventory_for(&caller).create_category(request).await?;
    Ok(created(id))
}

#[axum::debug_handler]
async fn get_category(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Category>> {
    Ok(Json(visible_category(&state, &caller, &id).await?))
}

/// Update a category.
///
/// PUT /categories/:id
///
/// The id comes from the path and the owner is never changed.
#[axum::debug_handler]
async fn update_category(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    validate_title(&request.title)?;

    let inventory = state.inventory_for(&caller);
    let existing = visible_category(&state, &caller, &id).await?;
    ensure_owner(&caller, &existing.user_id, "Category")?;

    let category = Category {
        title: request.title,
        image_url: request.image_url,
        ..existing
    };
    inventory.set_category(&category).await?;

    Ok(Json(category))
}

/// Delete a category.
///
/// DELETE /categories/:id
///
/// Removes the category's product types and their products first.
#[axum::debug_handler]
async fn delete_category(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let existing = visible_category(&state, &caller, &id).await?;
    ensure_owner(&caller, &existing.user_id, "Category")?;

    state.inventory_for(&caller).delete_category(&id).await?;

    Ok(Json(json!({
        "deleted": true,
        "id": id
    })))
}

#[axum::debug_handler]
async fn list_product_types(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductType>>> {
    visible_category(&state, &caller, &id).await?;
    let product_types = state
        .inventory_for(&caller)
        .list_product_types(&id, caller.user_id())
        .await?;
    Ok(Json(product_types))
}

/// Categories outside the caller's scope are reported as missing.
async fn visible_category(state: &AppState, caller: &Caller, id: &str) -> Result<Category> {
    let category = state.inventory.get_category(id).await?;
    if !is_visible(&category.user_id, caller.user_id()) {
        return Err(Error::NotFound(format!("Category not found: {}", id)));
    }
    Ok(category)
}
