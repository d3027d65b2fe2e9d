//! Product type model

use serde::{Deserialize, Serialize};

use crate::MILLIS_PER_MINUTE;

/// Template describing a kind of product and its default shelf life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category_id: String,
    /// `"global"` or the owning user id
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Shelf life in minutes
    #[serde(default)]
    pub time_to_expire: Option<i64>,
}

/// Input for creating a product type. Scope comes from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductType {
    pub category_id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub time_to_expire: Option<i64>,
}

impl ProductType {
    /// Build a product type from creation input; the id is assigned by the store.
    pub fn from_new(input: NewProductType, user_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            category_id: input.category_id,
            user_id: user_id.into(),
            title: input.title,
            image_url: input.image_url,
            time_to_expire: input.time_to_expire,
        }
    }

    /// Expiration derived from the shelf life for a product bought at
    /// `purchase_date`. `None` when no shelf life is set or the result
    /// does not fit in an i64.
    pub fn expiration_for(&self, purchase_date: i64) -> Option<i64> {
        self.time_to_expire
            .and_then(|minutes| minutes.checked_mul(MILLIS_PER_MINUTE))
            .and_then(|millis| purchase_date.checked_add(millis))
    }
}
