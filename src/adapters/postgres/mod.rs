//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! - `PostgresTemplateStore` - interview templates
//! - `PostgresMessageStore` - append-only interview messages
//!
//! Schema lives in `migrations/` and is applied by [`run_migrations`].

mod message_store;
mod template_store;

pub use message_store::PostgresMessageStore;
pub use template_store::PostgresTemplateStore;

use sqlx::PgPool;

use crate::ports::StoreError;

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::database(format!("Migration failed: {}", e)))
}
