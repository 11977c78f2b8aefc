//! In-Memory Template Store
//!
//! Keeps templates in a map guarded by an async RwLock.
//! Used when no database is configured, and in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{TemplateId, UserId};
use crate::domain::interview::InterviewTemplate;
use crate::ports::{StoreError, TemplateStore};

/// In-memory storage for interview templates
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    templates: Arc<RwLock<HashMap<TemplateId, InterviewTemplate>>>,
}

impl InMemoryTemplateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored templates
    pub async fn len(&self) -> usize {
        self.templates.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.templates.read().await.is_empty()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn save(&self, template: &InterviewTemplate) -> Result<InterviewTemplate, StoreError> {
        let mut templates = self.templates.write().await;
        templates.insert(*template.id(), template.clone());
        Ok(template.clone())
    }

    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<InterviewTemplate>, StoreError> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<InterviewTemplate>, StoreError> {
        let templates = self.templates.read().await;
        let mut owned: Vec<_> = templates
            .values()
            .filter(|t| t.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(owned)
    }
}
