//! SQLite-backed document store.
//!
//! All collections live in the `documents` table, one JSON body per row.
//! String-valued filters are pushed down to SQL through `json_extract`;
//! any other filter is evaluated in Rust on the fetched rows so both
//! store adapters share the exact semantics of `Filter::matches`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::DbPool;
use crate::error::{Error, Result};
use crate::store::{new_document_id, Document, DocumentStore, Fields, Filter};

/// Document store persisted in SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wrap an initialized pool. The schema must already be applied.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open a database at `path` and apply the schema.
    pub async fn open(path: &str) -> Result<Self> {
        let pool = super::init_pool(path).await?;
        super::initialize_schema(&pool).await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// JSON path for a top-level field, quoted so any field name is literal.
fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

/// String operands of a filter, when every operand is a string.
fn string_operands(filter: &Filter) -> Option<Vec<&str>> {
    match filter {
        Filter::Eq { value, .. } => value.as_str().map(|s| vec![s]),
        Filter::In { values, .. } if !values.is_empty() => {
            values.iter().map(Value::as_str).collect()
        }
        Filter::In { .. } => None,
    }
}

fn parse_body(id: &str, body: &str) -> Result<Fields> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(Error::Backend(format!("Document {} is not an object", id))),
        Err(e) => Err(Error::Backend(format!("Corrupt document {}: {}", id, e))),
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
        let mut binds: Vec<String> = Vec::new();
        let mut residual: Vec<&Filter> = Vec::new();

        for filter in filters {
            match string_operands(filter) {
                Some(operands) => {
                    let placeholders = vec!["?"; operands.len()].join(", ");
                    sql.push_str(&format!(" AND json_extract(body, ?) IN ({})", placeholders));
                    binds.push(json_path(filter.field()));
                    binds.extend(operands.into_iter().map(str::to_string));
                }
                None => residual.push(filter),
            }
        }
        sql.push_str(" ORDER BY seq");

        let mut q = sqlx::query_as::<_, (String, String)>(&sql).bind(collection);
        for bind in &binds {
            q = q.bind(bind.as_str());
        }
        let rows = q.fetch_all(&self.pool).await?;

        let mut docs = Vec::with_capacity(rows.len());
        for (id, body) in rows {
            let fields = parse_body(&id, &body)?;
            if residual.iter().all(|f| f.matches(&fields)) {
                docs.push(Document::new(id, fields));
            }
        }

        debug!(
            collection,
            filters = filters.len(),
            in_memory_filters = residual.len(),
            hits = docs.len(),
            "SQLite query"
        );

        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(body,)| parse_body(id, &body).map(|fields| Document::new(id, fields)))
            .transpose()
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = new_document_id();
        let body = Value::Object(fields).to_string();

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(&body)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let body = Value::Object(fields).to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES (?, ?, ?)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = excluded.body, updated_at = datetime('now')
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        super::health_check(&self.pool).await
    }
}
