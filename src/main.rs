use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use interview_coach::adapters::ai::{OpenAIConfig, OpenAIProvider};
use interview_coach::adapters::http::{api_router, InterviewHandlers};
use interview_coach::adapters::postgres::{
    run_migrations, PostgresMessageStore, PostgresTemplateStore,
};
use interview_coach::adapters::storage::{InMemoryMessageStore, InMemoryTemplateStore};
use interview_coach::application::InterviewOrchestrator;
use interview_coach::config::{AppConfig, DatabaseConfig};
use interview_coach::ports::{MessageStore, TemplateStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let (template_store, message_store) = match &config.database {
        Some(database) => postgres_stores(database).await?,
        None => {
            info!("no database configured, using in-memory stores");
            let templates: Arc<dyn TemplateStore> = Arc::new(InMemoryTemplateStore::new());
            let messages: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new());
            (templates, messages)
        }
    };

    let api_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let generation = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_stream_buffer(config.ai.stream_buffer),
    )?;

    let orchestrator = Arc::new(InterviewOrchestrator::new(
        template_store,
        message_store,
        Arc::new(generation),
        config.interview.prompts(),
    ));

    let app = api_router(InterviewHandlers::new(orchestrator), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, model = %config.ai.model, "interview coach listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn postgres_stores(
    database: &DatabaseConfig,
) -> Result<(Arc<dyn TemplateStore>, Arc<dyn MessageStore>), BoxError> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect(&database.url)
        .await?;

    if database.run_migrations {
        run_migrations(&pool).await?;
        info!("database migrations applied");
    }

    let templates: Arc<dyn TemplateStore> = Arc::new(PostgresTemplateStore::new(pool.clone()));
    let messages: Arc<dyn MessageStore> = Arc::new(PostgresMessageStore::new(pool));
    Ok((templates, messages))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
