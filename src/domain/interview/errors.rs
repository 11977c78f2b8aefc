//! Interview error taxonomy.
//!
//! Every failure surfaced by the orchestrator is one of four kinds so callers
//! (and transports) can tell them apart without string matching.

use thiserror::Error;

use crate::domain::foundation::{TemplateId, ValidationError};
use crate::ports::{GenerationError, StoreError};

/// Errors returned by interview operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterviewError {
    /// Malformed input detected before any I/O.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced template does not exist.
    #[error("Interview template not found: {0}")]
    NotFound(TemplateId),

    /// Persistence layer failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Generation backend failure, before or during streaming.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl InterviewError {
    pub fn not_found(id: TemplateId) -> Self {
        InterviewError::NotFound(id)
    }

    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            InterviewError::Validation(_) => "VALIDATION_FAILED",
            InterviewError::NotFound(_) => "TEMPLATE_NOT_FOUND",
            InterviewError::Store(_) => "STORE_ERROR",
            InterviewError::Generation(_) => "GENERATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_right_kind() {
        let err: InterviewError = ValidationError::empty_field("theme").into();
        assert!(matches!(err, InterviewError::Validation(_)));

        let err: InterviewError = StoreError::database("down").into();
        assert!(matches!(err, InterviewError::Store(_)));

        let err: InterviewError = GenerationError::AuthenticationFailed.into();
        assert!(matches!(err, InterviewError::Generation(_)));
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            InterviewError::Validation(ValidationError::empty_field("theme")).code(),
            InterviewError::not_found(TemplateId::new()).code(),
            InterviewError::Store(StoreError::database("x")).code(),
            InterviewError::Generation(GenerationError::network("x")).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn not_found_mentions_id() {
        let id = TemplateId::new();
        assert!(InterviewError::not_found(id).to_string().contains(&id.to_string()));
    }
}
