//! In-Memory Message Store
//!
//! Append-only log of messages per template.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::TemplateId;
use crate::domain::interview::InterviewMessage;
use crate::ports::{MessageStore, StoreError};

/// In-memory storage for interview messages
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<HashMap<TemplateId, Vec<InterviewMessage>>>>,
}

impl InMemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages across all templates
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(&self, message: &InterviewMessage) -> Result<(), StoreError> {
        let mut messages = self.messages.write().await;
        messages
            .entry(*message.template_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn find_by_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<InterviewMessage>, StoreError> {
        let messages = self.messages.read().await;
        Ok(messages.get(template_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::SenderType;

    #[tokio::test]
    async fn messages_come_back_in_recording_order() {
        let store = InMemoryMessageStore::new();
        let template_id = TemplateId::new();

        let question = InterviewMessage::new(template_id, SenderType::Assistant, "What is Rust?");
        let answer = InterviewMessage::new(template_id, SenderType::User, "A systems language");
        store.save(&question).await.unwrap();
        store.save(&answer).await.unwrap();

        let found = store.find_by_template(&template_id).await.unwrap();

        assert_eq!(found, vec![question, answer]);
    }

    #[tokio::test]
    async fn templates_are_isolated() {
        let store = InMemoryMessageStore::new();
        let a = TemplateId::new();
        let b = TemplateId::new();

        store
            .save(&InterviewMessage::new(a, SenderType::User, "answer"))
            .await
            .unwrap();

        assert!(store.find_by_template(&b).await.unwrap().is_empty());
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn empty_content_is_stored_verbatim() {
        let store = InMemoryMessageStore::new();
        let template_id = TemplateId::new();
        let message = InterviewMessage::new(template_id, SenderType::User, "");

        store.save(&message).await.unwrap();

        let found = store.find_by_template(&template_id).await.unwrap();
        assert_eq!(found[0].content(), "");
    }
}
