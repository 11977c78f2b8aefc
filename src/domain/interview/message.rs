//! Interview message entity and sender categories.

use crate::domain::foundation::{MessageId, TemplateId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a message.
///
/// Closed set: anything that is not a user answer is an assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SenderType {
    /// The interviewee.
    User,
    /// The AI interviewer.
    Assistant,
}

impl SenderType {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::User => "USER",
            SenderType::Assistant => "ASSISTANT",
        }
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SenderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(SenderType::User),
            "ASSISTANT" => Ok(SenderType::Assistant),
            other => Err(ValidationError::invalid_format(
                "sender",
                format!("unknown sender '{}', expected USER or ASSISTANT", other),
            )),
        }
    }
}

/// One recorded turn of an interview.
///
/// Messages are immutable; ordering between messages of the same template
/// is whatever order the caller recorded them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewMessage {
    id: MessageId,
    template_id: TemplateId,
    sender: SenderType,
    content: String,
    created_at: Timestamp,
}

impl InterviewMessage {
    /// Creates a new message for the given template.
    pub fn new(template_id: TemplateId, sender: SenderType, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            template_id,
            sender,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitute a message from persistence.
    pub fn reconstitute(
        id: MessageId,
        template_id: TemplateId,
        sender: SenderType,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            template_id,
            sender,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn template_id(&self) -> &TemplateId {
        &self.template_id
    }

    pub fn sender(&self) -> SenderType {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
