pub mod auth;
pub mod config;
pub mod kafka_abstraction;
pub mod logging;
pub mod memory_repository;
pub mod pg_repository;
pub mod repository;

pub use auth::{Argon2PasswordHasher, HashError, PasswordHasherTrait};
pub use config::{AppConfig, RepositoryBackend};
pub use kafka_abstraction::{
    AccountEventPublisherTrait, KafkaConfig, KafkaEventPublisher, PublishError,
};
pub use memory_repository::InMemoryAccountRepository;
pub use pg_repository::PostgresAccountRepository;
pub use repository::{
    AccountFilter, AccountPage, AccountRepositoryTrait, RepositoryError, MAX_PAGE_LIMIT,
};
