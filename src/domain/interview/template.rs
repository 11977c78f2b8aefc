//! Interview template entity.
//!
//! A template is a named interview session scoped to one user and one theme.
//! Messages reference a template by ID; the template never owns them.

use crate::domain::foundation::{TemplateId, Timestamp, UserId, ValidationError};
use serde::{Deserialize, Serialize};

/// Interview template - the subject an interview session is about.
///
/// # Invariants
///
/// - `id` is globally unique and never changes
/// - `theme` is non-empty (after trimming)
/// - templates are never mutated once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewTemplate {
    id: TemplateId,
    user_id: UserId,
    theme: String,
    created_at: Timestamp,
}

impl InterviewTemplate {
    /// Create a new template with a freshly assigned identifier.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if theme is blank
    pub fn new(user_id: UserId, theme: impl Into<String>) -> Result<Self, ValidationError> {
        let theme = theme.into();
        Self::validate_theme(&theme)?;

        Ok(Self {
            id: TemplateId::new(),
            user_id,
            theme,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute a template from persistence (no validation).
    pub fn reconstitute(
        id: TemplateId,
        user_id: UserId,
        theme: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            theme,
            created_at,
        }
    }

    /// Returns the template ID.
    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    /// Returns the owner's user ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the interview theme.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Returns when the template was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    fn validate_theme(theme: &str) -> Result<(), ValidationError> {
        if theme.trim().is_empty() {
            return Err(ValidationError::empty_field("theme"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[test]
    fn new_template_keeps_inputs() {
        let template = InterviewTemplate::new(user(), "Backend Engineer").unwrap();
        assert_eq!(template.user_id().as_str(), "u1");
        assert_eq!(template.theme(), "Backend Engineer");
    }

    #[test]
    fn new_templates_get_distinct_ids() {
        let a = InterviewTemplate::new(user(), "Rust").unwrap();
        let b = InterviewTemplate::new(user(), "Rust").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn empty_theme_is_rejected() {
        let err = InterviewTemplate::new(user(), "").unwrap_err();
        assert_eq!(err, ValidationError::empty_field("theme"));
    }

    #[test]
    fn whitespace_theme_is_rejected() {
        assert!(InterviewTemplate::new(user(), " \t\n").is_err());
    }

    #[test]
    fn reconstitute_preserves_fields() {
        let id = TemplateId::new();
        let created_at = Timestamp::now();
        let template =
            InterviewTemplate::reconstitute(id, user(), "Databases".to_string(), created_at);
        assert_eq!(*template.id(), id);
        assert_eq!(*template.created_at(), created_at);
    }
}
