// tests/account_tests.rs
mod common;
use common::*;
use storefront::accounts::{self, SignupForm};
use storefront::{seed, StoreError};

#[tokio::test]
async fn register_rejects_taken_username_and_email() {
  let pool = test_pool().await;
  create_user(&pool, "alice").await;

  let form = SignupForm {
    username: "alice".into(),
    email: "alice@example.com".into(),
    password1: "another-pass-9".into(),
    password2: "another-pass-9".into(),
  };
  match accounts::register(&pool, &form).await {
    Err(StoreError::InvalidForm(errors)) => {
      assert!(errors.has("username"));
      assert!(errors.has("email"));
    }
    other => panic!("expected InvalidForm, got {:?}", other),
  }
}

#[tokio::test]
async fn authenticate_checks_the_password() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;

  let found = accounts::authenticate(&pool, "alice", "s3cret-pass").await.unwrap();
  assert_eq!(found.map(|u| u.id), Some(alice.id));
  assert!(accounts::authenticate(&pool, "alice", "wrong").await.unwrap().is_none());
  assert!(accounts::authenticate(&pool, "nobody", "s3cret-pass").await.unwrap().is_none());
}

#[tokio::test]
async fn sessions_resolve_until_deleted_or_expired() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;

  let token = accounts::create_session(&pool, alice.id).await.unwrap();
  let user = accounts::user_for_session(&pool, &token).await.unwrap().unwrap();
  assert_eq!(user.username, "alice");

  accounts::delete_session(&pool, &token).await.unwrap();
  assert!(accounts::user_for_session(&pool, &token).await.unwrap().is_none());

  let stale = accounts::create_session(&pool, alice.id).await.unwrap();
  sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
    .bind(chrono::Utc::now() - chrono::Duration::hours(1))
    .bind(&stale)
    .execute(&pool)
    .await
    .unwrap();
  assert!(accounts::user_for_session(&pool, &stale).await.unwrap().is_none());
  let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions").fetch_one(&pool).await.unwrap();
  assert_eq!(left, 0);
}

#[tokio::test]
async fn expired_sessions_are_pruned_without_being_presented() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;
  let bob = create_user(&pool, "bob").await;

  let stale = accounts::create_session(&pool, alice.id).await.unwrap();
  sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
    .bind(chrono::Utc::now() - chrono::Duration::days(1))
    .bind(&stale)
    .execute(&pool)
    .await
    .unwrap();

  let fresh = accounts::create_session(&pool, bob.id).await.unwrap();
  let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
    .fetch_all(&pool)
    .await
    .unwrap();
  assert_eq!(tokens, vec![fresh.clone()]);

  sqlx::query("UPDATE sessions SET expires_at = ?")
    .bind(chrono::Utc::now() - chrono::Duration::seconds(1))
    .execute(&pool)
    .await
    .unwrap();
  assert_eq!(accounts::prune_expired_sessions(&pool).await.unwrap(), 1);
  assert_eq!(accounts::prune_expired_sessions(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn seeding_is_idempotent() {
  let pool = test_pool().await;
  let created = seed::seed_demo_catalog(&pool).await.unwrap();
  assert!(created > 0);
  assert_eq!(seed::seed_demo_catalog(&pool).await.unwrap(), 0);

  let admin = seed::bootstrap_admin(&pool, "admin", "admin@example.com", "admin-pass-123")
    .await
    .unwrap()
    .unwrap();
  assert!(admin.is_superuser);
  assert!(seed::bootstrap_admin(&pool, "admin", "admin@example.com", "admin-pass-123")
    .await
    .unwrap()
    .is_none());
}
