//! Recipe Routes
//!
//! Routes:
//! - GET /recipes - Visible recipes, most relevant first
//! - POST /recipes - Create a recipe owned by the caller
//! - GET /recipes/:id - Get a visible recipe
//! - DELETE /recipes/:id - Delete an owned recipe

use std::sync::atomic::Ordering;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use futures::future::try_join_all;
use serde_json::{json, Value};

use freshsaver_models::{is_visible, NewRecipe, RankedRecipe, Recipe};

use super::status::RANKING_REQUESTS;
use super::{created, ensure_owner, ensure_type_visible, validate_title, CreatedResponse};
use crate::identity::Caller;
use crate::{AppState, Error, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ranked_recipes).post(create_recipe))
        .route("/:id", get(get_recipe).delete(delete_recipe))
}

/// Ranked recipe suggestions.
///
/// GET /recipes
///
/// Recipes are ordered by how many of their ingredients the caller holds
/// unexpired. Ties keep store order.
#[axum::debug_handler]
async fn list_ranked_recipes(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<RankedRecipe>>> {
    RANKING_REQUESTS.fetch_add(1, Ordering::Relaxed);
    let ranked = state.recipes_for(&caller).ranked_recipes().await?;
    Ok(Json(ranked))
}

#[axum::debug_handler]
async fn create_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<NewRecipe>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    validate_title(&request.title)?;
    caller.user_id().ok_or(Error::Unauthenticated)?;

    // Ingredients must be product types the caller can see
    try_join_all(
        request
            .product_type_ids
            .iter()
            .map(|id| ensure_type_visible(&state, &caller, id)),
    )
    .await?;

    let id = state.inventory_for(&caller).create_recipe(request).await?;
    Ok(created(id))
}

#[axum::debug_handler]
async fn get_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>> {
    Ok(Json(visible_recipe(&state, &caller, &id).await?))
}

#[axum::debug_handler]
async fn delete_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let existing = visible_recipe(&state, &caller, &id).await?;
    ensure_owner(&caller, &existing.user_id, "Recipe")?;

    state.inventory_for(&caller).delete_recipe(&id).await?;

    Ok(Json(json!({
        "deleted": true,
        "id": id
    })))
}

async fn visible_recipe(state: &AppState, caller: &Caller, id: &str) -> Result<Recipe> {
    let recipe = state.inventory.get_recipe(id).await?;
    if !is_visible(&recipe.user_id, caller.user_id()) {
        return Err(Error::NotFound(format!("Recipe not found: {}", id)));
    }
    Ok(recipe)
}
