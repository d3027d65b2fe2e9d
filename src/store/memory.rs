//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{new_document_id, Document, DocumentStore, Fields, Filter};
use crate::error::Result;

/// Document store held entirely in memory.
///
/// Collections keep insertion order, so list results are stable across
/// calls. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        let guard = self.collections.read().await;
        let docs: Vec<Document> = guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filters.iter().all(|f| f.matches(&doc.fields)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(collection, filters = filters.len(), hits = docs.len(), "Memory query");
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = new_document_id();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|doc| doc.id == id) {
            Some(doc) => doc.fields = fields,
            None => docs.push(Document::new(id, fields)),
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_query_in_order() {
        let store = MemoryStore::new();
        let a = store.insert("items", fields(json!({"n": 1}))).await.unwrap();
        let b = store.insert("items", fields(json!({"n": 2}))).await.unwrap();
        assert_ne!(a, b);

        let docs = store.query("items", &[]).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str()]);
    }

    #[tokio::test]
    async fn test_set_overwrites_in_place() {
        let store = MemoryStore::new();
        let a = store.insert("items", fields(json!({"n": 1, "extra": true}))).await.unwrap();
        store.insert("items", fields(json!({"n": 2}))).await.unwrap();

        store.set("items", &a, fields(json!({"n": 10}))).await.unwrap();

        let docs = store.query("items", &[]).await.unwrap();
        assert_eq!(docs[0].id, a);
        assert_eq!(docs[0].fields, fields(json!({"n": 10})));
    }

    #[tokio::test]
    async fn test_set_creates_missing_document() {
        let store = MemoryStore::new();
        store.set("items", "fixed", fields(json!({"n": 1}))).await.unwrap();
        assert!(store.get("items", "fixed").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let a = store.insert("items", fields(json!({}))).await.unwrap();
        store.delete("items", &a).await.unwrap();
        store.delete("items", &a).await.unwrap();
        store.delete("missing", "nope").await.unwrap();
        assert_eq!(store.count("items").await, 0);
    }

    #[tokio::test]
    async fn test_query_applies_all_filters() {
        let store = MemoryStore::new();
        store
            .insert("items", fields(json!({"user_id": "u1", "category_id": "c1"})))
            .await
            .unwrap();
        store
            .insert("items", fields(json!({"user_id": "u2", "category_id": "c1"})))
            .await
            .unwrap();
        store
            .insert("items", fields(json!({"user_id": "global", "category_id": "c2"})))
            .await
            .unwrap();

        let docs = store
            .query(
                "items",
                &[
                    Filter::is_in("user_id", ["global", "u1"]),
                    Filter::eq("category_id", "c1"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields.get("user_id"), Some(&json!("u1")));
    }
}
