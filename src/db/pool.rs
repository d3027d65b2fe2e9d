//! SQLite connection pool for the document store.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use super::DbPool;
use crate::Result;

/// Connection settings derived from the database location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Idle connections are closed after this long. `None` keeps them.
    pub idle_timeout: Option<Duration>,
    /// How long a write waits on a locked database.
    pub busy_timeout: Duration,
}

impl PoolConfig {
    /// An in-memory database lives as long as its one connection, so it
    /// gets exactly one that never idles out. Files get a small pool.
    pub fn for_path(path: &str) -> Self {
        if is_in_memory(path) {
            Self {
                max_connections: 1,
                idle_timeout: None,
                busy_timeout: Duration::from_secs(5),
            }
        } else {
            Self {
                max_connections: 8,
                idle_timeout: Some(Duration::from_secs(600)),
                busy_timeout: Duration::from_secs(30),
            }
        }
    }
}

fn is_in_memory(path: &str) -> bool {
    matches!(path, ":memory:" | "sqlite::memory:")
}

/// Open a pool at `path`, creating the file and its parent directories.
pub async fn connect(path: &str, config: &PoolConfig) -> Result<DbPool> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // WAL lets readers run alongside the single writer
    let options = SqliteConnectOptions::from_str(path)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .idle_timeout(config.idle_timeout)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Round trip to the database.
pub async fn health_check(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
