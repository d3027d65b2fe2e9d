//! Recipe ranking.
//!
//! Recipes are ordered by how many of their ingredients the caller
//! currently holds unexpired. Products and product types are fetched
//! concurrently; recipes are fetched once both have arrived.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use tracing::debug;

use freshsaver_models::{now_millis, Product, ProductType, RankedRecipe, Recipe};

use super::InventoryService;
use crate::error::Result;

/// Which products feed the set of active product types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductScope {
    /// Only the caller's products; anonymous callers have none.
    Caller,
    /// Every product in the store, whoever owns it.
    #[default]
    All,
}

impl ProductScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::All => "all",
        }
    }
}

impl FromStr for ProductScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "caller" => Ok(Self::Caller),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown product scope: {}", s)),
        }
    }
}

/// Product type ids backed by at least one product that has not expired
/// at `now`.
pub fn active_product_type_ids(products: &[Product], now: i64) -> HashSet<String> {
    products
        .iter()
        .filter(|product| product.is_active_at(now))
        .map(|product| product.product_type_id.clone())
        .collect()
}

/// Score, stable-sort and render recipes.
///
/// Ties keep their input order. Ingredient ids are replaced by product
/// type titles; ids without a matching product type are dropped.
pub fn rank_recipes(
    recipes: Vec<Recipe>,
    active: &HashSet<String>,
    titles: &HashMap<String, String>,
) -> Vec<RankedRecipe> {
    let mut scored: Vec<(usize, Recipe)> = recipes
        .into_iter()
        .map(|recipe| {
            let score = recipe
                .product_type_ids
                .iter()
                .filter(|id| active.contains(*id))
                .count();
            (score, recipe)
        })
        .collect();

    // Vec::sort_by_key is stable
    scored.sort_by_key(|(score, _)| Reverse(*score));

    scored
        .into_iter()
        .map(|(score, recipe)| RankedRecipe {
            ingredients: recipe
                .product_type_ids
                .iter()
                .filter_map(|id| titles.get(id).cloned())
                .collect(),
            id: recipe.id,
            title: recipe.title,
            image_url: recipe.image_url,
            text: recipe.text,
            user_id: recipe.user_id,
            score,
        })
        .collect()
}

/// Service producing relevance-ordered recipe suggestions.
#[derive(Clone)]
pub struct RecipeService {
    inventory: InventoryService,
    product_scope: ProductScope,
}

impl RecipeService {
    pub fn new(inventory: InventoryService, product_scope: ProductScope) -> Self {
        Self {
            inventory,
            product_scope,
        }
    }

    /// Same configuration, scoped to another caller.
    pub fn with_inventory(&self, inventory: InventoryService) -> Self {
        Self {
            inventory,
            product_scope: self.product_scope,
        }
    }

    pub fn product_scope(&self) -> ProductScope {
        self.product_scope
    }

    /// Recipes visible to the caller, most relevant first.
    pub async fn ranked_recipes(&self) -> Result<Vec<RankedRecipe>> {
        self.ranked_recipes_at(now_millis()).await
    }

    /// Ranking as of `now` (epoch milliseconds).
    pub async fn ranked_recipes_at(&self, now: i64) -> Result<Vec<RankedRecipe>> {
        let caller = self.inventory.caller_id();

        let (products, product_types) = futures::try_join!(
            self.scoped_products(caller.as_deref()),
            self.inventory.list_all_product_types(),
        )?;

        let active = active_product_type_ids(&products, now);
        let titles = title_index(product_types);

        let recipes = self.inventory.list_recipes(caller.as_deref()).await?;

        debug!(
            products = products.len(),
            active_types = active.len(),
            recipes = recipes.len(),
            scope = self.product_scope.as_str(),
            "Ranking recipes"
        );

        Ok(rank_recipes(recipes, &active, &titles))
    }

    async fn scoped_products(&self, caller: Option<&str>) -> Result<Vec<Product>> {
        match (self.product_scope, caller) {
            (ProductScope::All, _) => self.inventory.list_all_products().await,
            (ProductScope::Caller, Some(user_id)) => self.inventory.list_products(user_id).await,
            (ProductScope::Caller, None) => Ok(Vec::new()),
        }
    }
}

fn title_index(product_types: Vec<ProductType>) -> HashMap<String, String> {
    product_types
        .into_iter()
        .map(|product_type| (product_type.id, product_type.title))
        .collect()
}
