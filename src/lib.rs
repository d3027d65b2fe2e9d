//! FreshSaver - Household Food Inventory
//!
//! Tracks purchased products and their expiration dates, organised by
//! category and product type, and suggests recipes ranked by how many of
//! their ingredients are still fresh.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod services;
pub mod state;
pub mod store;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
