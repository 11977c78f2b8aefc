//! Generation Client Port - Interface for the remote text-generation backend.
//!
//! The interview flow never waits for a whole completion: every generation is
//! exposed as a stream of text fragments that the caller pulls at its own pace.
//!
//! # Contract
//!
//! - `generate` returns immediately and performs **no work**; the backend
//!   request is issued when the stream is first polled
//! - fragments arrive in backend order; boundaries carry no meaning
//! - a backend failure (before or during streaming) is yielded as a single
//!   terminal `Err` item, after which the stream ends
//! - dropping the stream cancels the underlying request
//! - a stream is not restartable; calling `generate` again issues a new request

use futures::Stream;
use std::pin::Pin;

/// A lazy, ordered, finite sequence of generated text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// Port for streaming text generation.
pub trait GenerationClient: Send + Sync {
    /// Start (lazily) a generation for the given request.
    fn generate(&self, request: GenerationRequest) -> FragmentStream;
}

/// Contextual input handed to the backend alongside the system instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationContext {
    /// A single piece of text (e.g. the interview theme).
    Text(String),
    /// An ordered sequence; order is significant.
    Sequence(Vec<String>),
}

impl GenerationContext {
    /// Context entries in order.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            GenerationContext::Text(text) => vec![text.as_str()],
            GenerationContext::Sequence(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// Request for a streamed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fixed guidance steering the backend for this kind of operation.
    pub system_instruction: String,
    /// Contextual input.
    pub context: GenerationContext,
    /// Optional subject the generation is about.
    pub subject: Option<String>,
}

impl GenerationRequest {
    /// Creates a request with a single-text context.
    pub fn new(system_instruction: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            context: GenerationContext::Text(context.into()),
            subject: None,
        }
    }

    /// Creates a request with an ordered context.
    pub fn with_sequence<I, S>(system_instruction: impl Into<String>, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            system_instruction: system_instruction.into(),
            context: GenerationContext::Sequence(context.into_iter().map(Into::into).collect()),
            subject: None,
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Generation backend errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request or while streaming.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl GenerationError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if re-invoking the operation may succeed.
    ///
    /// Nothing in this crate retries automatically; callers decide.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. }
                | GenerationError::Unavailable { .. }
                | GenerationError::Network(_)
                | GenerationError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_has_single_entry_and_no_subject() {
        let request = GenerationRequest::new("Ask a question", "Backend Engineer");
        assert_eq!(request.context.entries(), vec!["Backend Engineer"]);
        assert!(request.subject.is_none());
    }

    #[test]
    fn sequence_request_preserves_order() {
        let request = GenerationRequest::with_sequence("Follow up", ["question", "answer"])
            .with_subject("Rust");
        assert_eq!(request.context.entries(), vec!["question", "answer"]);
        assert_eq!(request.subject.as_deref(), Some("Rust"));
    }

    #[test]
    fn generation_error_retryable_classification() {
        assert!(GenerationError::rate_limited(30).is_retryable());
        assert!(GenerationError::unavailable("down").is_retryable());
        assert!(GenerationError::network("reset").is_retryable());
        assert!(GenerationError::Timeout { timeout_secs: 30 }.is_retryable());

        assert!(!GenerationError::AuthenticationFailed.is_retryable());
        assert!(!GenerationError::content_filtered("unsafe").is_retryable());
        assert!(!GenerationError::parse("bad json").is_retryable());
    }

    #[test]
    fn generation_error_displays_correctly() {
        assert_eq!(
            GenerationError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            GenerationError::network("connection reset").to_string(),
            "network error: connection reset"
        );
    }

    #[test]
    fn generation_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn GenerationClient) {}
    }
}
