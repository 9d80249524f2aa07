use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A user account. `password_hash` is always a hash: plaintext passwords
/// never survive past the service boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub password_hash: String,
    pub email: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for account creation. The password is already hashed by the time
/// this reaches a repository; the repository assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub password_hash: String,
    pub email: String,
    pub country: String,
}

/// Partial profile update. `email: None` leaves the stored email unchanged.
/// Password and timestamps are never touched through this path.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub country: String,
    pub email: Option<String>,
}

#[derive(Debug, Error, Clone)]
pub enum AccountError {
    #[error("account not found")]
    NotFound,
    #[error("email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    HashingFailure(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("infrastructure error: {0}")]
    InfrastructureError(String),
}
