//! Recipe models

use serde::{Deserialize, Serialize};

/// A recipe whose ingredients reference product types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Ingredient product type ids; order matters for display only
    #[serde(default)]
    pub product_type_ids: Vec<String>,
    #[serde(default)]
    pub text: String,
    /// `"global"` or the owning user id
    #[serde(default = "default_scope")]
    pub user_id: String,
}

fn default_scope() -> String {
    crate::GLOBAL_SCOPE.to_string()
}

/// Input for creating a recipe. Scope comes from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_type_ids: Vec<String>,
    #[serde(default)]
    pub text: String,
}

impl Recipe {
    /// Build a recipe from creation input; the id is assigned by the store.
    pub fn from_new(input: NewRecipe, user_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: input.title,
            image_url: input.image_url,
            product_type_ids: input.product_type_ids,
            text: input.text,
            user_id: user_id.into(),
        }
    }
}

/// A recipe ready for display: ingredient ids replaced by product type
/// titles and annotated with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecipe {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub text: String,
    pub user_id: String,
    /// Number of ingredients backed by an unexpired product
    pub score: usize,
}
