//! Message store port.
//!
//! Append-only persistence for interview messages.

use crate::domain::foundation::TemplateId;
use crate::domain::interview::InterviewMessage;
use async_trait::async_trait;

use super::StoreError;

/// Repository port for interview messages.
///
/// Referential integrity (the template exists) is the caller's concern;
/// implementations may enforce it but are not required to.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message.
    ///
    /// # Errors
    ///
    /// - `StoreError` on persistence failure
    async fn save(&self, message: &InterviewMessage) -> Result<(), StoreError>;

    /// All messages recorded for a template, in the order they were recorded.
    async fn find_by_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<InterviewMessage>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn MessageStore) {}
    }
}
