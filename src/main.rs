use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

mod application;
mod domain;
mod infrastructure;
mod web;

use crate::application::AccountService;
use crate::infrastructure::{
    logging::init_logging, AccountRepositoryTrait, AppConfig, Argon2PasswordHasher,
    InMemoryAccountRepository, KafkaEventPublisher, PostgresAccountRepository, RepositoryBackend,
};
use crate::web::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let _log_guard = init_logging(None).map_err(anyhow::Error::from_boxed)?;

    info!("starting account management service");

    let config = AppConfig::from_env();

    let repository: Arc<dyn AccountRepositoryTrait> = match config.repository_backend {
        RepositoryBackend::Memory => {
            info!("using in-memory account repository");
            Arc::new(InMemoryAccountRepository::new())
        }
        RepositoryBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_pool_size)
                .connect(&config.database_url)
                .await
                .context("failed to connect to database")?;
            Arc::new(
                PostgresAccountRepository::new(pool)
                    .await
                    .context("failed to initialize account repository")?,
            )
        }
    };

    // Destinations must exist before the first publish.
    let publisher = KafkaEventPublisher::new(config.kafka.clone())
        .context("failed to create event publisher")?;
    publisher
        .declare_topics()
        .await
        .context("failed to declare account event topics")?;

    let service = Arc::new(AccountService::new(
        repository,
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(publisher),
    ));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", addr);

    axum::serve(listener, create_router(service)).await?;

    Ok(())
}
