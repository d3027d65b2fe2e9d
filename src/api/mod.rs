//! API Routes for FreshSaver
//!
//! This module combines all API routes into a single router.
//! Routes are organized by entity and share the caller-resolving middleware.

mod categories;
mod product_types;
mod products;
mod recipes;
pub mod status;

use axum::{http::StatusCode, Json, Router};
use serde::Serialize;

use freshsaver_models::{is_visible, GLOBAL_SCOPE};

use crate::identity::Caller;
use crate::middleware::identify_caller;
use crate::{AppState, Error, Result};

const MAX_TITLE_LEN: usize = 255;

/// Build the complete API router.
///
/// Route structure:
/// - /health, /status - Health checks (public)
/// - /categories/* - Categories and their product types
/// - /product-types/* - Product types and their products
/// - /products/* - The caller's purchases
/// - /recipes/* - Ranked recipe suggestions
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .merge(inventory_routes(state))
}

/// Inventory routes. Callers without a token are served as anonymous.
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::routes())
        .nest("/product-types", product_types::routes())
        .nest("/products", products::routes())
        .nest("/recipes", recipes::routes())
        .layer(axum::middleware::from_fn_with_state(state, identify_caller))
}

/// Body returned by every create endpoint.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

fn created(id: String) -> (StatusCode, Json<CreatedResponse>) {
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

/// Only the owner may change an entity. Global entities are read-only
/// over the API.
fn ensure_owner(caller: &Caller, owner_id: &str, what: &str) -> Result<()> {
    let user_id = caller.user_id().ok_or(Error::Unauthenticated)?;
    if owner_id == GLOBAL_SCOPE || user_id != owner_id {
        return Err(Error::Forbidden(format!("{} is not owned by the caller", what)));
    }
    Ok(())
}

/// Product types outside the caller's scope are reported as missing.
async fn ensure_type_visible(state: &AppState, caller: &Caller, id: &str) -> Result<()> {
    let product_type = state.inventory.get_product_type(id).await?;
    if !is_visible(&product_type.user_id, caller.user_id()) {
        return Err(Error::NotFound(format!("Product type not found: {}", id)));
    }
    Ok(())
}
