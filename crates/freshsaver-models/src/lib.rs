//! Data models for FreshSaver.
//!
//! Defines the inventory entities (categories, product types, products),
//! recipes, and the creation inputs accepted by the repository. Field
//! names match the document store wire contract so the same serde
//! representation is used for storage and for the HTTP API.

mod category;
mod product;
mod product_type;
mod recipe;
mod scope;

pub use category::*;
pub use product::*;
pub use product_type::*;
pub use recipe::*;
pub use scope::*;

use chrono::Utc;

/// Milliseconds in one minute; shelf life is stored in minutes.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * MILLIS_PER_MINUTE;

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
