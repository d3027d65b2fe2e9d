//! SQLite persistence for FreshSaver.
//!
//! Provides connection pooling, schema setup, and the SQLite-backed
//! document store.

mod documents;
mod pool;

pub use documents::SqliteStore;
pub use pool::{health_check, PoolConfig};

use crate::Result;
use tracing::info;

/// Type alias for the SQLite connection pool.
pub type DbPool = sqlx::SqlitePool;

/// Initialize the database connection pool.
pub async fn init_pool(path: &str) -> Result<DbPool> {
    let config = PoolConfig::for_path(path);
    let pool = pool::connect(path, &config).await?;

    info!(
        path,
        max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

/// Initialize the database schema.
///
/// Applies the complete schema from schema.sql. Uses IF NOT EXISTS
/// clauses so it's safe to run multiple times.
pub async fn initialize_schema(pool: &DbPool) -> Result<()> {
    let schema = include_str!("../../schema.sql");

    info!("Initializing database schema");

    // Split by semicolons and execute each statement
    for statement in schema.split(';') {
        // Strip comment lines, keeping only actual SQL
        let clean_stmt: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let clean_stmt = clean_stmt.trim();
        if clean_stmt.is_empty() {
            continue;
        }
        sqlx::query(clean_stmt).execute(pool).await?;
    }

    info!("Database schema initialized successfully");

    Ok(())
}
