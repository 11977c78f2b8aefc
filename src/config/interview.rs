//! Interview prompt configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::InterviewPrompts;

/// System instructions for the two kinds of generation
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    /// Instruction for the opening question of a template
    pub interview_system_message: String,

    /// Instruction for a follow-up question
    pub follow_system_message: String,
}

impl InterviewConfig {
    /// Validate interview configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interview_system_message.trim().is_empty() {
            return Err(ValidationError::MissingRequired("INTERVIEW_SYSTEM_MESSAGE"));
        }
        if self.follow_system_message.trim().is_empty() {
            return Err(ValidationError::MissingRequired("FOLLOW_SYSTEM_MESSAGE"));
        }
        Ok(())
    }

    /// Prompts to inject into the orchestrator
    pub fn prompts(&self) -> InterviewPrompts {
        InterviewPrompts::new(
            self.interview_system_message.clone(),
            self.follow_system_message.clone(),
        )
    }
}
