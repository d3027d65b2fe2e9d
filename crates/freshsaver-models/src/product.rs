//! Product model

use serde::{Deserialize, Serialize};

use crate::MILLIS_PER_DAY;

/// A purchased item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub product_type_id: String,
    /// Owning user id; products are never global
    #[serde(default)]
    pub user_id: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub purchase_date: i64,
    /// Epoch milliseconds
    #[serde(default)]
    pub expiration_date: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

/// Input for logging a purchase. Without `expiration_date` the shelf life
/// of the referenced product type is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_type_id: String,
    pub purchase_date: i64,
    #[serde(default)]
    pub expiration_date: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl Product {
    /// Build a product from creation input with a resolved expiration.
    pub fn from_new(input: NewProduct, user_id: impl Into<String>, expiration_date: i64) -> Self {
        Self {
            id: String::new(),
            product_type_id: input.product_type_id,
            user_id: user_id.into(),
            purchase_date: input.purchase_date,
            expiration_date,
            title: input.title,
            cost: input.cost,
        }
    }

    /// Not yet expired at `now`.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.expiration_date > now
    }

    /// Whole days until expiry, truncated toward zero (negative once expired
    /// by more than a day).
    pub fn days_left(&self, now: i64) -> i64 {
        self.expiration_date.saturating_sub(now) / MILLIS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(expiration_date: i64) -> Product {
        Product {
            id: "p1".to_string(),
            product_type_id: "t1".to_string(),
            user_id: "u1".to_string(),
            purchase_date: 0,
            expiration_date,
            title: None,
            cost: None,
        }
    }

    #[test]
    fn expiry_boundary_is_not_active() {
        assert!(product(1_001).is_active_at(1_000));
        assert!(!product(1_000).is_active_at(1_000));
        assert!(!product(999).is_active_at(1_000));
    }

    #[test]
    fn days_left_truncates() {
        assert_eq!(product(MILLIS_PER_DAY * 3 - 1).days_left(0), 2);
        assert_eq!(product(MILLIS_PER_DAY * 3).days_left(0), 3);
        assert_eq!(product(0).days_left(MILLIS_PER_DAY / 2), 0);
        assert_eq!(product(0).days_left(MILLIS_PER_DAY * 2), -2);
    }
}
