use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Account, AccountUpdate, NewAccount};
use crate::infrastructure::repository::{
    AccountFilter, AccountPage, AccountRepositoryTrait, RepositoryError,
};

/// In-memory account store for tests and low-scale deployments. All access
/// goes through the lock so id assignment and insert stay atomic; deletes are
/// hard deletes since there is nothing to soft-delete for.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of stored accounts. Test helper.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountRepositoryTrait for InMemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(RepositoryError::EmailExists(account.email));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            nickname: account.nickname,
            password_hash: account.password_hash,
            email: account.email,
            country: account.country,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        accounts.push(account.clone());

        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, RepositoryError> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, RepositoryError> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|a| a.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: Uuid, update: AccountUpdate) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;

        if let Some(email) = &update.email {
            if accounts.iter().any(|a| a.id != id && &a.email == email) {
                return Err(RepositoryError::EmailExists(email.clone()));
            }
        }

        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;

        account.first_name = update.first_name;
        account.last_name = update.last_name;
        account.nickname = update.nickname;
        account.country = update.country;
        if let Some(email) = update.email {
            account.email = email;
        }
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;

        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);

        if accounts.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn query(&self, filter: &AccountFilter) -> Result<AccountPage, RepositoryError> {
        let accounts = self.accounts.read().await;
        let matches: Vec<Account> = accounts
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        let total_count = matches.len() as u64;

        let accounts = match filter.window() {
            Some((offset, limit)) => matches
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            None => matches,
        };

        Ok(AccountPage {
            accounts,
            total_count,
        })
    }
}
