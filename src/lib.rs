pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod web;

// Re-export commonly used types
pub use application::{AccountProfile, AccountService};
pub use domain::{Account, AccountError, AccountEvent, AccountUpdate, NewAccount};
pub use infrastructure::repository::AccountRepositoryTrait;
pub use infrastructure::{
    AccountFilter, AccountPage, Argon2PasswordHasher, InMemoryAccountRepository, KafkaConfig,
    KafkaEventPublisher, PostgresAccountRepository,
};
