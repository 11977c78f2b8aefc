//! Request/response DTOs for interview endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::interview::{InterviewError, InterviewMessage, InterviewTemplate};

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateRequest {
    pub user_id: String,
    pub theme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListTemplatesQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpRequest {
    pub theme: String,
    pub previous_question: String,
    pub previous_answer: String,
}

/// `sender` stays a raw string here so an unknown value becomes a
/// validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveMessageRequest {
    pub sender: String,
    pub content: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateResponse {
    pub template_id: String,
    pub user_id: String,
    pub theme: String,
    pub created_at: String,
}

impl From<&InterviewTemplate> for TemplateResponse {
    fn from(template: &InterviewTemplate) -> Self {
        Self {
            template_id: template.id().to_string(),
            user_id: template.user_id().to_string(),
            theme: template.theme().to_string(),
            created_at: template.created_at().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message_id: String,
    pub template_id: String,
    pub sender: String,
    pub content: String,
    pub created_at: String,
}

impl From<&InterviewMessage> for MessageResponse {
    fn from(message: &InterviewMessage) -> Self {
        Self {
            message_id: message.id().to_string(),
            template_id: message.template_id().to_string(),
            sender: message.sender().to_string(),
            content: message.content().to_string(),
            created_at: message.created_at().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }
}

impl From<&InterviewError> for ErrorResponse {
    fn from(error: &InterviewError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TemplateId, UserId};
    use crate::domain::interview::SenderType;

    #[test]
    fn create_template_request_deserializes() {
        let json = r#"{"user_id": "u1", "theme": "Backend Engineer"}"#;
        let req: CreateTemplateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.theme, "Backend Engineer");
    }

    #[test]
    fn save_message_request_keeps_unknown_sender() {
        let json = r#"{"sender": "BOT", "content": "hi"}"#;
        let req: SaveMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.sender, "BOT");
    }

    #[test]
    fn template_response_carries_inputs() {
        let template =
            InterviewTemplate::new(UserId::new("u1").unwrap(), "Backend Engineer").unwrap();
        let response = TemplateResponse::from(&template);

        assert_eq!(response.template_id, template.id().to_string());
        assert_eq!(response.user_id, "u1");
        assert_eq!(response.theme, "Backend Engineer");
    }

    #[test]
    fn message_response_uses_wire_sender() {
        let message = InterviewMessage::new(TemplateId::new(), SenderType::Assistant, "q");
        assert_eq!(MessageResponse::from(&message).sender, "ASSISTANT");
    }

    #[test]
    fn error_response_uses_error_code() {
        let error = InterviewError::not_found(TemplateId::new());
        let response = ErrorResponse::from(&error);
        assert_eq!(response.code, "TEMPLATE_NOT_FOUND");
        assert!(response.message.contains("not found"));
    }
}
