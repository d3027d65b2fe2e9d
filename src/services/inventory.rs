//! Inventory service.
//!
//! Owner-scoped CRUD over categories, product types, products and recipes.
//! Every call goes to the document store; nothing is cached. Deletes of
//! parents cascade to their children, innermost first, and are not atomic:
//! a failure part way leaves the children deleted and the parent intact,
//! so the caller can simply retry.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use freshsaver_models::{
    visible_scopes, Category, NewCategory, NewProduct, NewProductType, NewRecipe, Product,
    ProductType, Recipe, GLOBAL_SCOPE,
};

use crate::error::{Error, Result};
use crate::identity::IdentityProvider;
use crate::store::collections::{CATEGORIES, PRODUCTS, PRODUCT_TYPES, RECIPES};
use crate::store::{decode_all, encode, fields, DocumentStore, Filter};

/// Repository for the household inventory.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl InventoryService {
    /// Create a new inventory service.
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Same store, different caller. Used to scope a shared service to
    /// the identity of one request.
    pub fn with_identity(&self, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store: self.store.clone(),
            identity,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Current caller id, if any.
    pub fn caller_id(&self) -> Option<String> {
        self.identity.current_user_id()
    }

    /// The caller id new entities are stamped with. The global scope tag
    /// is never a valid owner.
    fn require_caller(&self) -> Result<String> {
        match self.caller_id() {
            Some(user_id) if user_id == GLOBAL_SCOPE => Err(Error::Forbidden(
                "The global scope cannot own entities".to_string(),
            )),
            Some(user_id) => Ok(user_id),
            None => Err(Error::Unauthenticated),
        }
    }

    fn scope_filter(owner_id: Option<&str>) -> Filter {
        Filter::is_in(fields::USER_ID, visible_scopes(owner_id))
    }

    async fn fetch<T: DeserializeOwned>(&self, collection: &str, id: &str, what: &str) -> Result<T> {
        self.store
            .get(collection, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} not found: {}", what, id)))?
            .decode()
    }

    async fn ensure_exists(&self, collection: &str, id: &str, what: &str) -> Result<()> {
        match self.store.get(collection, id).await? {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("{} not found: {}", what, id))),
        }
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Categories visible to `owner_id` (global ones plus the owner's own).
    pub async fn list_categories(&self, owner_id: Option<&str>) -> Result<Vec<Category>> {
        let docs = self
            .store
            .query(CATEGORIES, &[Self::scope_filter(owner_id)])
            .await?;
        decode_all(docs)
    }

    pub async fn get_category(&self, id: &str) -> Result<Category> {
        self.fetch(CATEGORIES, id, "Category").await
    }

    /// Create a category owned by the caller.
    pub async fn create_category(&self, input: NewCategory) -> Result<String> {
        let user_id = self.require_caller()?;
        let category = Category::from_new(input, user_id);
        let id = self.store.insert(CATEGORIES, encode(&category)?).await?;
        info!(id = %id, title = %category.title, "Created category");
        Ok(id)
    }

    /// Overwrite a category by id.
    pub async fn set_category(&self, category: &Category) -> Result<()> {
        self.ensure_exists(CATEGORIES, &category.id, "Category").await?;
        self.store
            .set(CATEGORIES, &category.id, encode(category)?)
            .await?;
        info!(id = %category.id, "Updated category");
        Ok(())
    }

    /// Delete a category and everything under it.
    ///
    /// Product types visible to the caller are removed concurrently, each
    /// after its own products. The category itself goes last, and only if
    /// every product type delete succeeded.
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        let caller = self.caller_id();
        let product_types = self.list_product_types(id, caller.as_deref()).await?;

        try_join_all(
            product_types
                .iter()
                .map(|product_type| self.delete_product_type(&product_type.id)),
        )
        .await?;

        self.store.delete(CATEGORIES, id).await?;

        info!(
            id = %id,
            product_types = product_types.len(),
            "Deleted category"
        );

        Ok(())
    }

    // ========================================================================
    // Product types
    // ========================================================================

    /// Product types of a category visible to `owner_id`.
    pub async fn list_product_types(
        &self,
        category_id: &str,
        owner_id: Option<&str>,
    ) -> Result<Vec<ProductType>> {
        let docs = self
            .store
            .query(
                PRODUCT_TYPES,
                &[
                    Self::scope_filter(owner_id),
                    Filter::eq(fields::CATEGORY_ID, category_id),
                ],
            )
            .await?;
        decode_all(docs)
    }

    /// Every product type regardless of scope. Only used to resolve
    /// ingredient titles.
    pub async fn list_all_product_types(&self) -> Result<Vec<ProductType>> {
        decode_all(self.store.query(PRODUCT_TYPES, &[]).await?)
    }

    pub async fn get_product_type(&self, id: &str) -> Result<ProductType> {
        self.fetch(PRODUCT_TYPES, id, "Product type").await
    }

    /// Create a product type owned by the caller.
    pub async fn create_product_type(&self, input: NewProductType) -> Result<String> {
        let user_id = self.require_caller()?;
        let product_type = ProductType::from_new(input, user_id);
        let id = self
            .store
            .insert(PRODUCT_TYPES, encode(&product_type)?)
            .await?;
        info!(
            id = %id,
            category_id = %product_type.category_id,
            title = %product_type.title,
            "Created product type"
        );
        Ok(id)
    }

    /// Overwrite a product type by id.
    pub async fn set_product_type(&self, product_type: &ProductType) -> Result<()> {
        self.ensure_exists(PRODUCT_TYPES, &product_type.id, "Product type")
            .await?;
        self.store
            .set(PRODUCT_TYPES, &product_type.id, encode(product_type)?)
            .await?;
        info!(id = %product_type.id, "Updated product type");
        Ok(())
    }

    /// Delete a product type after every product that references it.
    pub async fn delete_product_type(&self, id: &str) -> Result<()> {
        let products = self.list_products_by_type(id).await?;

        try_join_all(products.iter().map(|product| self.delete_product(&product.id))).await?;

        self.store.delete(PRODUCT_TYPES, id).await?;

        info!(id = %id, products = products.len(), "Deleted product type");

        Ok(())
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Products owned by `owner_id`.
    pub async fn list_products(&self, owner_id: &str) -> Result<Vec<Product>> {
        let docs = self
            .store
            .query(PRODUCTS, &[Filter::eq(fields::USER_ID, owner_id)])
            .await?;
        decode_all(docs)
    }

    /// Every product referencing a product type, whoever owns it.
    pub async fn list_products_by_type(&self, product_type_id: &str) -> Result<Vec<Product>> {
        let docs = self
            .store
            .query(PRODUCTS, &[Filter::eq(fields::PRODUCT_TYPE_ID, product_type_id)])
            .await?;
        decode_all(docs)
    }

    /// Every product of every user.
    pub async fn list_all_products(&self) -> Result<Vec<Product>> {
        decode_all(self.store.query(PRODUCTS, &[]).await?)
    }

    pub async fn get_product(&self, id: &str) -> Result<Product> {
        self.fetch(PRODUCTS, id, "Product").await
    }

    /// Log a purchase for the caller.
    ///
    /// Without an explicit expiration the referenced product type's shelf
    /// life is added to the purchase date. Nothing is written when the
    /// expiration cannot be determined.
    pub async fn create_product(&self, input: NewProduct) -> Result<String> {
        let user_id = self.require_caller()?;
        let product_type = self.get_product_type(&input.product_type_id).await?;

        let expiration_date = match input.expiration_date {
            Some(explicit) => explicit,
            None => product_type
                .expiration_for(input.purchase_date)
                .ok_or_else(|| {
                    Error::InvalidState(format!(
                        "Cannot derive expiration date: product type {} has no usable shelf life",
                        product_type.id
                    ))
                })?,
        };

        let product = Product::from_new(input, user_id, expiration_date);
        let id = self.store.insert(PRODUCTS, encode(&product)?).await?;

        info!(
            id = %id,
            product_type_id = %product.product_type_id,
            expiration_date = product.expiration_date,
            "Created product"
        );

        Ok(id)
    }

    /// Overwrite a product by id. The stored owner is kept.
    pub async fn update_product(&self, product: &Product) -> Result<()> {
        let existing = self.get_product(&product.id).await?;

        let updated = Product {
            user_id: existing.user_id,
            ..product.clone()
        };
        self.store
            .set(PRODUCTS, &updated.id, encode(&updated)?)
            .await?;

        info!(id = %updated.id, "Updated product");
        Ok(())
    }

    /// Remove a product. Removing an absent product is not an error.
    pub async fn delete_product(&self, id: &str) -> Result<()> {
        self.store.delete(PRODUCTS, id).await?;
        debug!(id = %id, "Deleted product");
        Ok(())
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    /// Recipes visible to `owner_id`, in store order.
    pub async fn list_recipes(&self, owner_id: Option<&str>) -> Result<Vec<Recipe>> {
        let docs = self
            .store
            .query(RECIPES, &[Self::scope_filter(owner_id)])
            .await?;
        decode_all(docs)
    }

    pub async fn get_recipe(&self, id: &str) -> Result<Recipe> {
        self.fetch(RECIPES, id, "Recipe").await
    }

    /// Create a recipe owned by the caller.
    pub async fn create_recipe(&self, input: NewRecipe) -> Result<String> {
        let user_id = self.require_caller()?;
        let recipe = Recipe::from_new(input, user_id);
        let id = self.store.insert(RECIPES, encode(&recipe)?).await?;
        info!(
            id = %id,
            ingredients = recipe.product_type_ids.len(),
            "Created recipe"
        );
        Ok(id)
    }

    /// Remove a recipe. Removing an absent recipe is not an error.
    pub async fn delete_recipe(&self, id: &str) -> Result<()> {
        self.store.delete(RECIPES, id).await?;
        info!(id = %id, "Deleted recipe");
        Ok(())
    }
}
