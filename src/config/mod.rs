//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTERVIEW_COACH` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use interview_coach::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod error;
mod interview;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use interview::InterviewConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; in-memory stores are used when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Generation backend configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Interview system instructions
    pub interview: InterviewConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTERVIEW_COACH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTERVIEW_COACH__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `INTERVIEW_COACH__INTERVIEW__FOLLOW_SYSTEM_MESSAGE=...` -> `interview.follow_system_message = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTERVIEW_COACH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.ai.validate()?;
        self.interview.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }
}
