//! Category model

use serde::{Deserialize, Serialize};

/// Top-level grouping for product types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    /// `"global"` or the owning user id
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Input for creating a category. Scope comes from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Category {
    /// Build a category from creation input; the id is assigned by the store.
    pub fn from_new(input: NewCategory, user_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            title: input.title,
            image_url: input.image_url,
        }
    }
}
