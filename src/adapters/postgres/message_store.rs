//! PostgreSQL implementation of MessageStore.
//!
//! Messages are ordered by an insertion sequence rather than `created_at`,
//! so two messages recorded within the same clock tick keep their order.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{MessageId, TemplateId, Timestamp};
use crate::domain::interview::{InterviewMessage, SenderType};
use crate::ports::{MessageStore, StoreError};

/// PostgreSQL implementation of MessageStore.
#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    /// Creates a new PostgresMessageStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn save(&self, message: &InterviewMessage) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO interview_messages (id, template_id, sender, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.template_id().as_uuid())
        .bind(message.sender().as_str())
        .bind(message.content())
        .bind(message.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert message: {}", e)))?;

        Ok(())
    }

    async fn find_by_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<InterviewMessage>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, template_id, sender, content, created_at
            FROM interview_messages
            WHERE template_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(template_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch messages: {}", e)))?;

        rows.into_iter().map(row_to_message).collect()
    }
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<InterviewMessage, StoreError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::database(format!("Failed to get id: {}", e)))?;

    let template_id: uuid::Uuid = row
        .try_get("template_id")
        .map_err(|e| StoreError::database(format!("Failed to get template_id: {}", e)))?;

    let sender: String = row
        .try_get("sender")
        .map_err(|e| StoreError::database(format!("Failed to get sender: {}", e)))?;
    let sender: SenderType = sender
        .parse()
        .map_err(|e| StoreError::corrupt(format!("Invalid sender: {}", e)))?;

    let content: String = row
        .try_get("content")
        .map_err(|e| StoreError::database(format!("Failed to get content: {}", e)))?;

    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| StoreError::database(format!("Failed to get created_at: {}", e)))?;

    Ok(InterviewMessage::reconstitute(
        MessageId::from_uuid(id),
        TemplateId::from_uuid(template_id),
        sender,
        content,
        Timestamp::from_datetime(created_at),
    ))
}
