//! HTTP listener configuration

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;

/// Where and how the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind, e.g. `0.0.0.0`
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `production` switches logs to JSON
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds allowed until the response head is sent
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated browser origins allowed by CORS
    pub cors_origins: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        self.host
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, self.port))
            .map_err(|_| ValidationError::InvalidAddress(self.host.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured CORS origins; blank entries are skipped.
    pub fn allowed_origins(&self) -> impl Iterator<Item = &str> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.socket_addr()?;
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(origin) = self
            .allowed_origins()
            .find(|o| !o.starts_with("http://") && !o.starts_with("https://"))
        {
            return Err(ValidationError::InvalidCorsOrigin(origin.to_string()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,interview_coach=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origins(origins: &str) -> ServerConfig {
        ServerConfig {
            cors_origins: Some(origins.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ServerConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.allowed_origins().count(), 0);
    }

    #[test]
    fn ipv6_host_is_bracketed_in_the_address() {
        let config = ServerConfig {
            host: "::1".to_string(),
            port: 3000,
            ..Default::default()
        };

        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:3000");
    }

    #[test]
    fn hostname_is_not_a_bind_address() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidAddress("localhost".to_string()))
        );
    }

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        let config = with_origins(" https://coach.example.com,,http://localhost:5173 ");

        assert_eq!(
            config.allowed_origins().collect::<Vec<_>>(),
            vec!["https://coach.example.com", "http://localhost:5173"]
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn origin_without_scheme_is_rejected() {
        assert_eq!(
            with_origins("https://coach.example.com,coach.example.com").validate(),
            Err(ValidationError::InvalidCorsOrigin("coach.example.com".to_string()))
        );
    }

    #[test]
    fn request_timeout_is_bounded() {
        for secs in [0, 301] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }
}
