//! Configuration management for FreshSaver.
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) covering:
//! - Server bind address
//! - Document store backend and database location
//! - Identity token verification
//! - Recipe ranking scope
//! - Optional seed catalog

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::services::ProductScope;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub ranking: RankingConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which document store adapter to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown store backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// SQLite database path (ignored by the memory backend)
    pub database_path: String,
}

/// Verification settings for bearer tokens issued by the identity provider.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,
    /// Required `iss` claim, if set
    pub jwt_issuer: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub product_scope: ProductScope,
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// JSON catalog applied at startup
    pub path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: parse_or("PORT", 8080),
            },
            store: StoreConfig {
                backend: parse_or("STORE_BACKEND", StoreBackend::Sqlite),
                database_path: env_or("DATABASE_PATH", "./data/freshsaver.db"),
            },
            auth: AuthConfig {
                jwt_secret: env::var("AUTH_JWT_SECRET").unwrap_or_else(|_| {
                    tracing::warn!("AUTH_JWT_SECRET not set; generated a random secret, no token will verify");
                    nanoid::nanoid!(32)
                }),
                jwt_issuer: env::var("AUTH_JWT_ISSUER").ok(),
            },
            ranking: RankingConfig {
                product_scope: parse_or("RANKING_PRODUCT_SCOPE", ProductScope::default()),
            },
            seed: SeedConfig {
                path: env::var("SEED_PATH").ok().filter(|p| !p.trim().is_empty()),
            },
        }
    }
}

/// Get environment variable or default value
fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse environment variable, falling back to the default when unset or
/// malformed.
fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, value = %raw, error = %e, "Invalid configuration value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
