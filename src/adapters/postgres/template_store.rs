//! PostgreSQL implementation of TemplateStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{TemplateId, Timestamp, UserId};
use crate::domain::interview::InterviewTemplate;
use crate::ports::{StoreError, TemplateStore};

/// PostgreSQL implementation of TemplateStore.
#[derive(Clone)]
pub struct PostgresTemplateStore {
    pool: PgPool,
}

impl PostgresTemplateStore {
    /// Creates a new PostgresTemplateStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PostgresTemplateStore {
    async fn save(&self, template: &InterviewTemplate) -> Result<InterviewTemplate, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO interview_templates (id, user_id, theme, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(template.id().as_uuid())
        .bind(template.user_id().as_str())
        .bind(template.theme())
        .bind(template.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert template: {}", e)))?;

        Ok(template.clone())
    }

    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<InterviewTemplate>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, theme, created_at
            FROM interview_templates
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch template: {}", e)))?;

        row.map(row_to_template).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<InterviewTemplate>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, theme, created_at
            FROM interview_templates
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch templates by user: {}", e)))?;

        rows.into_iter().map(row_to_template).collect()
    }
}

fn row_to_template(row: sqlx::postgres::PgRow) -> Result<InterviewTemplate, StoreError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::database(format!("Failed to get id: {}", e)))?;

    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| StoreError::database(format!("Failed to get user_id: {}", e)))?;

    let theme: String = row
        .try_get("theme")
        .map_err(|e| StoreError::database(format!("Failed to get theme: {}", e)))?;

    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| StoreError::database(format!("Failed to get created_at: {}", e)))?;

    Ok(InterviewTemplate::reconstitute(
        TemplateId::from_uuid(id),
        UserId::new(user_id).map_err(|e| StoreError::corrupt(format!("Invalid user_id: {}", e)))?,
        theme,
        Timestamp::from_datetime(created_at),
    ))
}
