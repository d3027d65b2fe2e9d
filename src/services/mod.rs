//! Service layer for FreshSaver.
//!
//! Contains the business logic on top of the document store:
//! - Inventory (categories, product types, products, recipes; cascading deletes)
//! - Recipes (relevance ranking against the caller's unexpired products)
//! - Seed (global catalog applied at startup)

mod inventory;
mod recipes;
pub mod seed;

pub use inventory::InventoryService;
pub use recipes::{active_product_type_ids, rank_recipes, ProductScope, RecipeService};
