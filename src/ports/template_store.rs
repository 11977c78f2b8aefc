//! Template store port.
//!
//! Durable persistence for interview templates. Templates are written once
//! and never updated, so the contract is save + lookups only.

use crate::domain::foundation::{TemplateId, UserId};
use crate::domain::interview::InterviewTemplate;
use async_trait::async_trait;

use super::StoreError;

/// Repository port for interview templates.
///
/// Implementations are shared across every concurrent session and must be
/// safe for concurrent use; the caller performs no locking.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Persist a new template and return the stored representation.
    ///
    /// # Errors
    ///
    /// - `StoreError` on persistence failure
    async fn save(&self, template: &InterviewTemplate) -> Result<InterviewTemplate, StoreError>;

    /// Find a template by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<InterviewTemplate>, StoreError>;

    /// Find all templates owned by a user, newest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<InterviewTemplate>, StoreError>;
}
