//! Generation backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Generation backend configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (covers the whole streamed response)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Capacity of the fragment channel between backend and consumer
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.stream_buffer == 0 || self.stream_buffer > 1024 {
            return Err(ValidationError::InvalidStreamBuffer);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_stream_buffer() -> usize {
    32
}
