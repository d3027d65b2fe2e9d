//! Application state for FreshSaver.
//!
//! Contains the shared state that is passed to all handlers. Services are
//! built once with an anonymous identity and re-scoped per request.

use std::sync::Arc;

use tracing::info;

use crate::config::{AuthConfig, Config, StoreBackend};
use crate::db::SqliteStore;
use crate::identity::Caller;
use crate::services::seed::{apply_catalog, Catalog};
use crate::services::{InventoryService, ProductScope, RecipeService};
use crate::store::{DocumentStore, MemoryStore};
use crate::Result;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backing document store.
    pub store: Arc<dyn DocumentStore>,
    /// Inventory repository (anonymous identity).
    pub inventory: InventoryService,
    /// Recipe ranking (anonymous identity).
    pub recipes: RecipeService,
    /// Bearer token verification settings.
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    /// Create the application state from configuration: open the store and
    /// apply the seed catalog if one is configured.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.store.database_path).await?),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        info!(backend = store.backend_name(), "Document store ready");

        if let Some(path) = &config.seed.path {
            let catalog = Catalog::load(path).await?;
            apply_catalog(store.as_ref(), &catalog).await?;
        }

        Ok(Self::from_parts(
            store,
            config.ranking.product_scope,
            config.auth.clone(),
        ))
    }

    /// Assemble state around an existing store.
    pub fn from_parts(
        store: Arc<dyn DocumentStore>,
        product_scope: ProductScope,
        auth: AuthConfig,
    ) -> Self {
        let inventory = InventoryService::new(store.clone(), Caller::anonymous().into_provider());
        let recipes = RecipeService::new(inventory.clone(), product_scope);

        Self {
            store,
            inventory,
            recipes,
            auth: Arc::new(auth),
        }
    }

    /// Inventory service acting as `caller`.
    pub fn inventory_for(&self, caller: &Caller) -> InventoryService {
        self.inventory.with_identity(caller.clone().into_provider())
    }

    /// Recipe service acting as `caller`.
    pub fn recipes_for(&self, caller: &Caller) -> RecipeService {
        self.recipes.with_inventory(self.inventory_for(caller))
    }
}
