use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use account_service::domain::{AccountUpdate, NewAccount};
use account_service::infrastructure::repository::{
    AccountFilter, AccountRepositoryTrait, RepositoryError, MAX_PAGE_LIMIT,
};
use account_service::infrastructure::InMemoryAccountRepository;

fn new_account(email: &str, nickname: &str, country: &str) -> NewAccount {
    NewAccount {
        first_name: "user".to_string(),
        last_name: "one".to_string(),
        nickname: nickname.to_string(),
        password_hash: "hash".to_string(),
        email: email.to_string(),
        country: country.to_string(),
    }
}

#[tokio::test]
async fn create_assigns_id_and_equal_timestamps() {
    let repo = InMemoryAccountRepository::new();

    let account = repo
        .create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();

    assert!(!account.id.is_nil());
    assert_eq!(account.created_at, account.updated_at);
    assert!(account.deleted_at.is_none());
}

#[tokio::test]
async fn create_enforces_email_uniqueness() {
    let repo = InMemoryAccountRepository::new();

    repo.create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();

    let result = repo
        .create(new_account("user1@mail.com", "user_2", "country2"))
        .await;

    assert!(matches!(result, Err(RepositoryError::EmailExists(email)) if email == "user1@mail.com"));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn get_by_email_finds_the_account() {
    let repo = InMemoryAccountRepository::new();

    let created = repo
        .create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();

    let found = repo.get_by_email("user1@mail.com").await.unwrap();
    assert_eq!(found.id, created.id);

    let missing = repo.get_by_email("nobody@mail.com").await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn update_keeps_email_when_not_provided() {
    let repo = InMemoryAccountRepository::new();

    let account = repo
        .create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();

    let updated = repo
        .update(
            account.id,
            AccountUpdate {
                first_name: "changed".to_string(),
                last_name: account.last_name.clone(),
                nickname: account.nickname.clone(),
                country: account.country.clone(),
                email: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "changed");
    assert_eq!(updated.email, "user1@mail.com");
    assert_eq!(updated.created_at, account.created_at);
    assert!(updated.updated_at >= account.updated_at);
}

#[tokio::test]
async fn update_rejects_email_taken_by_another_account() {
    let repo = InMemoryAccountRepository::new();

    repo.create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();
    let second = repo
        .create(new_account("user2@mail.com", "user_2", "country2"))
        .await
        .unwrap();

    let result = repo
        .update(
            second.id,
            AccountUpdate {
                first_name: second.first_name.clone(),
                last_name: second.last_name.clone(),
                nickname: second.nickname.clone(),
                country: second.country.clone(),
                email: Some("user1@mail.com".to_string()),
            },
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::EmailExists(_))));
}

#[tokio::test]
async fn update_missing_account_returns_not_found() {
    let repo = InMemoryAccountRepository::new();

    let result = repo
        .update(
            Uuid::new_v4(),
            AccountUpdate {
                first_name: "x".to_string(),
                last_name: "y".to_string(),
                nickname: "z".to_string(),
                country: "c".to_string(),
                email: None,
            },
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn update_password_only_touches_the_hash() {
    let repo = InMemoryAccountRepository::new();

    let account = repo
        .create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();

    repo.update_password(account.id, "new-hash").await.unwrap();

    let stored = repo.get_by_id(account.id).await.unwrap();
    assert_eq!(stored.password_hash, "new-hash");
    assert_eq!(stored.nickname, account.nickname);
    assert_eq!(stored.created_at, account.created_at);

    let missing = repo.update_password(Uuid::new_v4(), "hash").await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn delete_removes_the_account() {
    let repo = InMemoryAccountRepository::new();

    let account = repo
        .create(new_account("user1@mail.com", "user_1", "country1"))
        .await
        .unwrap();

    repo.delete(account.id).await.unwrap();
    assert!(repo.is_empty().await);

    let again = repo.delete(account.id).await;
    assert!(matches!(again, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn query_applies_predicates_with_and() {
    let repo = InMemoryAccountRepository::new();

    repo.create(new_account("user1@mail.com", "shared", "country1"))
        .await
        .unwrap();
    repo.create(new_account("user2@mail.com", "shared", "country2"))
        .await
        .unwrap();
    repo.create(new_account("user3@mail.com", "other", "country2"))
        .await
        .unwrap();

    let page = repo
        .query(&AccountFilter {
            nickname: Some("shared".to_string()),
            country: Some("country2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.accounts.len(), 1);
    assert_eq!(page.accounts[0].email, "user2@mail.com");
    assert_eq!(page.total_count, 1);
}

#[tokio::test]
async fn query_window_reports_full_match_count() {
    let repo = InMemoryAccountRepository::new();

    for i in 0..5 {
        repo.create(new_account(
            &format!("user{i}@mail.com"),
            &format!("user_{i}"),
            "country1",
        ))
        .await
        .unwrap();
    }

    let page = repo
        .query(&AccountFilter {
            page: Some(3),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.accounts.len(), 1);
    assert_eq!(page.total_count, 5);
}

#[test]
fn filter_window_clamps_out_of_range_values() {
    let filter = AccountFilter {
        page: Some(0),
        limit: Some(10),
        ..Default::default()
    };
    assert_eq!(filter.window(), Some((0, 10)));

    let filter = AccountFilter {
        page: Some(2),
        limit: Some(1000),
        ..Default::default()
    };
    assert_eq!(filter.window(), Some((u64::from(MAX_PAGE_LIMIT), 100)));

    let filter = AccountFilter {
        page: Some(4),
        limit: Some(0),
        ..Default::default()
    };
    assert_eq!(filter.window(), None);

    assert_eq!(AccountFilter::default().window(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_lose_inserts() {
    let repo = Arc::new(InMemoryAccountRepository::new());

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create(new_account(
                    &format!("user{i}@mail.com"),
                    &format!("user_{i}"),
                    "country1",
                ))
                .await
                .unwrap()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let account = handle.await.unwrap();
        ids.insert(account.id);
    }

    assert_eq!(ids.len(), 50);
    assert_eq!(repo.len().await, 50);
}
