//! Document store abstraction.
//!
//! The repository talks to its backing store through the `DocumentStore`
//! trait: named collections of schemaless JSON documents addressed by a
//! store-generated id. Two adapters exist:
//! - `MemoryStore` - in-process, used for tests and ephemeral deployments
//! - `SqliteStore` (in `crate::db`) - documents persisted in SQLite
//!
//! List results are returned in insertion order; overwriting a document
//! keeps its position.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Collection names used by the inventory.
pub mod collections {
    pub const CATEGORIES: &str = "categories";
    pub const PRODUCT_TYPES: &str = "product_types";
    pub const PRODUCTS: &str = "products";
    pub const RECIPES: &str = "recipes";
}

/// Document field names (the wire contract).
pub mod fields {
    pub const USER_ID: &str = "user_id";
    pub const CATEGORY_ID: &str = "category_id";
    pub const PRODUCT_TYPE_ID: &str = "product_type_id";
}

/// Document body without its id.
pub type Fields = Map<String, Value>;

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode into a model type. The document id is injected as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| Error::Backend(format!("Malformed document {}: {}", self.id, e)))
    }
}

/// Encode a model into document fields. Any `id` field is dropped since
/// the id is the document key, not part of the body.
pub fn encode<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(Error::Internal(format!(
            "Expected an object when encoding a document, got {}",
            other
        ))),
        Err(e) => Err(Error::Internal(format!("Failed to encode document: {}", e))),
    }
}

/// Decode a list of documents.
pub fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>> {
    docs.into_iter().map(Document::decode).collect()
}

/// Query predicate on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value.
    Eq { field: String, value: Value },
    /// Field equals one of the values.
    In { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn is_in<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::In { field, .. } => field,
        }
    }

    /// Evaluate against a document body. A missing field never matches.
    pub fn matches(&self, fields: &Fields) -> bool {
        let Some(actual) = fields.get(self.field()) else {
            return false;
        };
        match self {
            Self::Eq { value, .. } => actual == value,
            Self::In { values, .. } => values.iter().any(|v| v == actual),
        }
    }
}

/// Core trait for document stores.
///
/// Every operation is a single independent round trip; there are no
/// transactions across calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name of the backend for logs and status output.
    fn backend_name(&self) -> &'static str;

    /// Documents in `collection` matching every filter.
    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>>;

    /// Fetch by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a new document and return its generated id.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Overwrite the whole document stored under `id`, creating it if absent.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Remove by id. Removing an absent id is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Generate a document id.
pub fn new_document_id() -> String {
    nanoid::nanoid!(20)
}
