use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Account, AccountUpdate, NewAccount};

/// Hard cap on the page size a caller can request; larger values are clamped.
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("account not found")]
    NotFound,
    #[error("email '{0}' already exists")]
    EmailExists(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unexpected repository error: {0}")]
    Unexpected(String),
}

/// Query options for account listing. Set predicates combine with AND; an
/// empty filter matches every non-deleted account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    pub id: Option<Uuid>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AccountFilter {
    /// Pagination window as `(offset, limit)`, or `None` when no window was
    /// requested. Out-of-range values are clamped: `page < 1` becomes 1 and
    /// `limit` is capped at [`MAX_PAGE_LIMIT`]; `limit == 0` means no window.
    pub fn window(&self) -> Option<(u64, u64)> {
        let limit = match self.limit {
            Some(0) | None => return None,
            Some(limit) => limit.min(MAX_PAGE_LIMIT),
        };
        let page = self.page.unwrap_or(1).max(1);
        Some(((u64::from(page) - 1) * u64::from(limit), u64::from(limit)))
    }

    pub fn matches(&self, account: &Account) -> bool {
        self.id.map_or(true, |id| account.id == id)
            && matches_opt(&self.nickname, &account.nickname)
            && matches_opt(&self.email, &account.email)
            && matches_opt(&self.country, &account.country)
    }
}

fn matches_opt(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |w| w == actual)
}

/// One page of accounts plus the total number of matches before the window
/// was applied.
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    pub total_count: u64,
}

/// Persistence capability for accounts. Two variants implement it with the
/// same semantics: an in-memory store and a Postgres store. The service does
/// the business validation; the repository only enforces its own email
/// uniqueness constraint as a second line of defense.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync + 'static {
    /// Assigns id and timestamps, with `created_at == updated_at`.
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Account, RepositoryError>;

    async fn get_by_email(&self, email: &str) -> Result<Account, RepositoryError>;

    /// Partial update of profile fields only; advances `updated_at`.
    async fn update(&self, id: Uuid, update: AccountUpdate) -> Result<Account, RepositoryError>;

    /// Replaces the stored hash; advances `updated_at`.
    async fn update_password(&self, id: Uuid, password_hash: &str)
        -> Result<(), RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Applies the filter predicates (AND) in insertion order and returns the
    /// requested window plus the total match count.
    async fn query(&self, filter: &AccountFilter) -> Result<AccountPage, RepositoryError>;
}
