use std::sync::Arc;

use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::{Account, AccountError, AccountEvent, AccountUpdate, NewAccount};
use crate::infrastructure::auth::{HashError, PasswordHasherTrait};
use crate::infrastructure::kafka_abstraction::AccountEventPublisherTrait;
use crate::infrastructure::repository::{
    AccountFilter, AccountPage, AccountRepositoryTrait, RepositoryError,
};

/// Profile fields supplied by the caller on account creation; the plaintext
/// password travels separately and is hashed before anything is stored.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
}

/// Minimal shape check; anything fancier belongs to the mail system that
/// actually delivers to the address.
fn validate_email(email: &str) -> Result<(), AccountError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AccountError::InvalidArgument(format!(
            "malformed email '{email}'"
        )));
    }
    Ok(())
}

impl From<RepositoryError> for AccountError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AccountError::NotFound,
            RepositoryError::EmailExists(email) => AccountError::DuplicateEmail(email),
            RepositoryError::Database(e) => AccountError::InfrastructureError(e.to_string()),
            RepositoryError::Unexpected(msg) => AccountError::InfrastructureError(msg),
        }
    }
}

impl From<HashError> for AccountError {
    fn from(err: HashError) -> Self {
        AccountError::HashingFailure(err.to_string())
    }
}

/// Orchestrates the account lifecycle: validates business rules, delegates
/// persistence, hashes credentials, and announces every successful mutation.
/// Holds no cross-request state; all operations are safe to call
/// concurrently.
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
    hasher: Arc<dyn PasswordHasherTrait>,
    publisher: Arc<dyn AccountEventPublisherTrait>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AccountRepositoryTrait>,
        hasher: Arc<dyn PasswordHasherTrait>,
        publisher: Arc<dyn AccountEventPublisherTrait>,
    ) -> Self {
        Self {
            repository,
            hasher,
            publisher,
        }
    }

    /// Adds a new account. Fails with `DuplicateEmail` when the email is
    /// already taken and `HashingFailure` when the password cannot be
    /// hashed; publishes `account_created` on success.
    #[instrument(skip(self, password), fields(email = %profile.email))]
    pub async fn add_account(
        &self,
        profile: AccountProfile,
        password: &str,
    ) -> Result<Account, AccountError> {
        validate_email(&profile.email)?;
        self.ensure_email_free(&profile.email).await?;

        let password_hash = self.hasher.hash(password)?;

        let account = self
            .repository
            .create(NewAccount {
                first_name: profile.first_name,
                last_name: profile.last_name,
                nickname: profile.nickname,
                password_hash,
                email: profile.email,
                country: profile.country,
            })
            .await?;

        info!(account_id = %account.id, "account created");
        self.publish_detached(AccountEvent::AccountCreated {
            account_id: account.id,
        });

        Ok(account)
    }

    /// Replaces the profile fields of an existing account. The password and
    /// `created_at` are never touched through this path.
    #[instrument(skip(self, update))]
    pub async fn modify_account(
        &self,
        id: Uuid,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        let existing = self.repository.get_by_id(id).await?;

        if let Some(email) = &update.email {
            validate_email(email)?;
            if *email != existing.email {
                self.ensure_email_free(email).await?;
            }
        }

        let account = self.repository.update(id, update).await?;

        info!(account_id = %account.id, "account modified");
        self.publish_detached(AccountEvent::AccountModified {
            account_id: account.id,
        });

        Ok(account)
    }

    /// Verifies the old password against the stored hash, then persists a
    /// hash of the new one. The profile is untouched.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let account = self.repository.get_by_id(id).await?;

        if !self.hasher.validate(&account.password_hash, old_password) {
            return Err(AccountError::InvalidCredentials);
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.repository.update_password(id, &password_hash).await?;

        info!(account_id = %id, "password changed");
        self.publish_detached(AccountEvent::AccountModified { account_id: id });

        Ok(())
    }

    /// Deletes an account. Deleting an id that does not exist is an
    /// idempotent success and publishes nothing.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AccountError> {
        match self.repository.delete(id).await {
            Ok(()) => {
                info!(account_id = %id, "account deleted");
                self.publish_detached(AccountEvent::AccountDeleted { account_id: id });
                Ok(())
            }
            Err(RepositoryError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists accounts matching the filter. Set predicates combine with AND;
    /// an empty filter returns every non-deleted account.
    #[instrument(skip(self))]
    pub async fn get_accounts_by_filter(
        &self,
        filter: &AccountFilter,
    ) -> Result<AccountPage, AccountError> {
        Ok(self.repository.query(filter).await?)
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), AccountError> {
        match self.repository.get_by_email(email).await {
            Ok(_) => Err(AccountError::DuplicateEmail(email.to_string())),
            Err(RepositoryError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Publishes on a detached task so event delivery never blocks or fails
    /// the response, and outlives the caller's cancellation scope. Failures
    /// are only visible in the logs.
    fn publish_detached(&self, event: AccountEvent) {
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(&event).await {
                error!(
                    event = event.event_type(),
                    account_id = %event.account_id(),
                    error = %e,
                    "failed to publish account event"
                );
            }
        });
    }
}
