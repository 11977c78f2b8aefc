//! PostgreSQL store configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound on the pool; interview traffic is a handful of short queries.
const MAX_POOL_SIZE: u32 = 64;

/// Connection settings for the Postgres template and message stores.
///
/// The whole section is optional; without it templates and messages are
/// kept in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a free connection before a store call fails
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply the embedded interview schema on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Settings for `url` with every other field at its default.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: default_run_migrations(),
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        let scheme = self.url.split_once("://").map(|(scheme, _)| scheme);
        if !matches!(scheme, Some("postgres" | "postgresql")) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_run_migrations() -> bool {
    true
}
