use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgDatabaseError;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Account, AccountUpdate, NewAccount};
use crate::infrastructure::repository::{
    AccountFilter, AccountPage, AccountRepositoryTrait, RepositoryError,
};

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, nickname, password_hash, \
     email, country, created_at, updated_at, deleted_at";

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    nickname: String,
    password_hash: String,
    email: String,
    country: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            nickname: row.nickname,
            password_hash: row.password_hash,
            email: row.email,
            country: row.country,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Durable account store. Rows are soft-deleted by setting `deleted_at`;
/// every read and query filters deleted rows out. Email uniqueness is
/// enforced by a partial unique index over the live rows, so a deleted
/// account frees its email for reuse.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Connects the repository to an existing pool and ensures the schema is
    /// in place.
    pub async fn new(pool: PgPool) -> Result<Self, RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                nickname TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                email TEXT NOT NULL,
                country TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                deleted_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_key \
             ON accounts (email) WHERE deleted_at IS NULL",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    fn map_unique_violation(err: sqlx::Error, email: &str) -> RepositoryError {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>() {
                // 23505 = unique_violation
                if pg_err.code() == "23505" && pg_err.constraint() == Some("accounts_email_key") {
                    return RepositoryError::EmailExists(email.to_string());
                }
            }
        }
        RepositoryError::Database(err)
    }
}

#[async_trait]
impl AccountRepositoryTrait for PostgresAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let now = Utc::now();
        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO accounts
                (id, first_name, last_name, nickname, password_hash, email, country,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id, first_name, last_name, nickname, password_hash,
                      email, country, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.nickname)
        .bind(&account.password_hash)
        .bind(&account.email)
        .bind(&account.country)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(e, &account.email))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(RepositoryError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: Uuid, update: AccountUpdate) -> Result<Account, RepositoryError> {
        let email_for_error = update.email.clone().unwrap_or_default();
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET first_name = $2,
                last_name = $3,
                nickname = $4,
                country = $5,
                email = COALESCE($6, email),
                updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, first_name, last_name, nickname, password_hash,
                      email, country, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.nickname)
        .bind(&update.country)
        .bind(&update.email)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(e, &email_for_error))?;

        row.map(Account::from).ok_or(RepositoryError::NotFound)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $2, updated_at = $3 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE accounts SET deleted_at = $2, updated_at = $2 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn query(&self, filter: &AccountFilter) -> Result<AccountPage, RepositoryError> {
        const PREDICATES: &str = "deleted_at IS NULL \
             AND ($1::uuid IS NULL OR id = $1) \
             AND ($2::text IS NULL OR nickname = $2) \
             AND ($3::text IS NULL OR email = $3) \
             AND ($4::text IS NULL OR country = $4)";

        let total_count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM accounts WHERE {PREDICATES}"))
                .bind(filter.id)
                .bind(&filter.nickname)
                .bind(&filter.email)
                .bind(&filter.country)
                .fetch_one(&self.pool)
                .await?;

        // LIMIT NULL disables the window; ordering must stay deterministic
        // across pages.
        let (offset, limit) = match filter.window() {
            Some((offset, limit)) => (offset as i64, Some(limit as i64)),
            None => (0, None),
        };

        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {PREDICATES} \
             ORDER BY created_at, id OFFSET $5 LIMIT $6"
        ))
        .bind(filter.id)
        .bind(&filter.nickname)
        .bind(&filter.email)
        .bind(&filter.country)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(AccountPage {
            accounts: rows.into_iter().map(Account::from).collect(),
            total_count: total_count as u64,
        })
    }
}
