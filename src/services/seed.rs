//! Global catalog seeding.
//!
//! A JSON catalog of shared categories, product types and recipes can be
//! applied at startup. Entries carry fixed ids and are written with
//! full-overwrite semantics, so applying the same catalog twice is a no-op.
//!
//! ```json
//! {
//!   "categories": [{"id": "dairy", "title": "Dairy"}],
//!   "product_types": [{"id": "milk", "category_id": "dairy", "title": "Milk", "time_to_expire": 10080}],
//!   "recipes": [{"id": "pancakes", "title": "Pancakes", "product_type_ids": ["milk"], "text": "..."}]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use freshsaver_models::{Category, ProductType, Recipe, GLOBAL_SCOPE};

use crate::error::{Error, Result};
use crate::store::collections::{CATEGORIES, PRODUCT_TYPES, RECIPES};
use crate::store::{encode, DocumentStore};

/// Global entities to install.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub product_types: Vec<ProductType>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

/// Counts of entries written by [`apply_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub product_types: usize,
    pub recipes: usize,
}

impl Catalog {
    /// Parse a catalog from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::InvalidInput(format!("Invalid seed catalog: {}", e)))
    }

    /// Load a catalog file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        let ids = self
            .categories
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.product_types.iter().map(|t| t.id.as_str()))
            .chain(self.recipes.iter().map(|r| r.id.as_str()));
        for id in ids {
            if id.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "Seed catalog entries need a non-empty id".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Write every catalog entry with global scope.
pub async fn apply_catalog(store: &dyn DocumentStore, catalog: &Catalog) -> Result<SeedSummary> {
    catalog.validate()?;

    for category in &catalog.categories {
        let category = Category {
            user_id: GLOBAL_SCOPE.to_string(),
            ..category.clone()
        };
        store.set(CATEGORIES, &category.id, encode(&category)?).await?;
    }

    for product_type in &catalog.product_types {
        let product_type = ProductType {
            user_id: GLOBAL_SCOPE.to_string(),
            ..product_type.clone()
        };
        store
            .set(PRODUCT_TYPES, &product_type.id, encode(&product_type)?)
            .await?;
    }

    for recipe in &catalog.recipes {
        let recipe = Recipe {
            user_id: GLOBAL_SCOPE.to_string(),
            ..recipe.clone()
        };
        store.set(RECIPES, &recipe.id, encode(&recipe)?).await?;
    }

    let summary = SeedSummary {
        categories: catalog.categories.len(),
        product_types: catalog.product_types.len(),
        recipes: catalog.recipes.len(),
    };

    info!(
        categories = summary.categories,
        product_types = summary.product_types,
        recipes = summary.recipes,
        "Applied seed catalog"
    );

    Ok(summary)
}
