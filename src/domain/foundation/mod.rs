//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and validation errors
//! that form the vocabulary of the interview domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{MessageId, TemplateId, UserId};
pub use timestamp::Timestamp;
