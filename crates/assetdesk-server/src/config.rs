//! Configuration management

use std::str::FromStr;

use assetdesk_common::types::SecurityLabel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::DEFAULT_MAX_ATTEMPTS;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/assetdesk";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub access: AccessConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Where assets, rules and logs are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown storage backend '{}': expected postgres or memory", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Access evaluation and version ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Labels above this are denied to non-admins. `None` keeps labels advisory.
    pub clearance_threshold: Option<SecurityLabel>,
    pub version_retry_attempts: u32,
    /// Admin principal seeded into the in-memory store
    pub bootstrap_admin: Option<Uuid>,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Like [`env_parse`], but a present value that does not parse is an error
fn env_parse_strict<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        _ => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("ASSETDESK_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_parse("ASSETDESK_PORT").unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("ASSETDESK_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            storage: env_parse_strict("ASSETDESK_STORAGE")?.unwrap_or_default(),
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_parse("DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: env_parse("DATABASE_IDLE_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(true),
            },
            access: AccessConfig {
                clearance_threshold: env_parse_strict("ASSETDESK_CLEARANCE_THRESHOLD")?,
                version_retry_attempts: env_parse("ASSETDESK_VERSION_RETRY_ATTEMPTS")
                    .unwrap_or(DEFAULT_MAX_ATTEMPTS),
                bootstrap_admin: env_parse_strict("ASSETDESK_BOOTSTRAP_ADMIN")?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.storage == StorageBackend::Postgres {
            if self.database.url.is_empty() {
                anyhow::bail!("Database URL cannot be empty");
            }

            if self.database.max_connections == 0 {
                anyhow::bail!("Database max_connections must be greater than 0");
            }

            if self.database.min_connections > self.database.max_connections {
                anyhow::bail!(
                    "Database min_connections ({}) cannot be greater than max_connections ({})",
                    self.database.min_connections,
                    self.database.max_connections
                );
            }
        }

        if self.access.version_retry_attempts == 0 {
            anyhow::bail!("Version retry attempts must be at least 1");
        }

        if self.storage == StorageBackend::Postgres && self.access.bootstrap_admin.is_some() {
            tracing::warn!("ASSETDESK_BOOTSTRAP_ADMIN is ignored with postgres storage");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            storage: StorageBackend::Postgres,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            access: AccessConfig {
                clearance_threshold: None,
                version_retry_attempts: DEFAULT_MAX_ATTEMPTS,
                bootstrap_admin: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: &[&str] = &[
        "ASSETDESK_HOST",
        "ASSETDESK_PORT",
        "ASSETDESK_STORAGE",
        "ASSETDESK_CLEARANCE_THRESHOLD",
        "ASSETDESK_VERSION_RETRY_ATTEMPTS",
        "ASSETDESK_BOOTSTRAP_ADMIN",
        "CORS_ALLOWED_ORIGINS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.access.version_retry_attempts, 3);
        assert!(config.access.clearance_threshold.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_pool_settings() {
        let mut config = Config::default();
        config.database.min_connections = 50;
        assert!(config.validate().is_err());

        // Pool settings do not matter without a database
        config.storage = StorageBackend::Memory;
        assert!(config.validate().is_ok());

        config.access.version_retry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(" Postgres ".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    #[serial]
    fn test_load_reads_environment() {
        clear_env();
        let admin = Uuid::new_v4();
        std::env::set_var("ASSETDESK_PORT", "9100");
        std::env::set_var("ASSETDESK_STORAGE", "memory");
        std::env::set_var("ASSETDESK_CLEARANCE_THRESHOLD", "L3");
        std::env::set_var("ASSETDESK_VERSION_RETRY_ATTEMPTS", "5");
        std::env::set_var("ASSETDESK_BOOTSTRAP_ADMIN", admin.to_string());
        std::env::set_var("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,");

        let config = Config::load().unwrap();
        clear_env();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.access.clearance_threshold, Some(SecurityLabel::L3));
        assert_eq!(config.access.version_retry_attempts, 5);
        assert_eq!(config.access.bootstrap_admin, Some(admin));
        assert_eq!(config.cors.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_strict_values() {
        clear_env();
        std::env::set_var("ASSETDESK_STORAGE", "memory");
        std::env::set_var("ASSETDESK_CLEARANCE_THRESHOLD", "L9");
        let result = Config::load();
        clear_env();
        assert!(result.is_err());

        std::env::set_var("ASSETDESK_BOOTSTRAP_ADMIN", "not-a-uuid");
        let result = Config::load();
        clear_env();
        assert!(result.is_err());
    }
}
