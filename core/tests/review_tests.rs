// tests/review_tests.rs
mod common;
use common::*;
use storefront::accounts;
use storefront::reviews::{self, ReviewForm};
use storefront::{Money, Permission, StoreError};

fn review(rating: &str, comment: &str) -> ReviewForm {
  ReviewForm {
    rating: Some(rating.to_string()),
    comment: Some(comment.to_string()),
  }
}

#[tokio::test]
async fn second_review_by_same_user_is_rejected() {
  let pool = test_pool().await;
  let user = create_user(&pool, "alice").await;
  let cat = create_category(&pool, "Audio").await;
  let product = create_product(&pool, &cat, "Speaker", Money::from_units(20)).await;

  reviews::add_review(&pool, &user, product.id, &review("5", "Loud and clear"))
    .await
    .unwrap();
  let again = reviews::add_review(&pool, &user, product.id, &review("1", "Changed my mind")).await;
  assert!(matches!(again, Err(StoreError::AlreadyReviewed { .. })));

  let listed = reviews::for_product(&pool, product.id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].username, "alice");
  assert_eq!(listed[0].rating, 5);
}

#[tokio::test]
async fn missing_fields_and_bad_ratings_are_validation_errors() {
  let pool = test_pool().await;
  let user = create_user(&pool, "alice").await;
  let cat = create_category(&pool, "Audio").await;
  let product = create_product(&pool, &cat, "Speaker", Money::from_units(20)).await;

  let blank = ReviewForm {
    rating: Some("4".into()),
    comment: None,
  };
  assert!(matches!(
    reviews::add_review(&pool, &user, product.id, &blank).await,
    Err(StoreError::Validation(_))
  ));
  assert!(matches!(
    reviews::add_review(&pool, &user, product.id, &review("9", "too good")).await,
    Err(StoreError::Validation(_))
  ));
  assert!(matches!(
    reviews::add_review(&pool, &user, 4242, &review("3", "ok")).await,
    Err(StoreError::NotFound { .. })
  ));
  assert!(reviews::for_product(&pool, product.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_author_or_moderator_may_delete() {
  let pool = test_pool().await;
  let author = create_user(&pool, "alice").await;
  let stranger = create_user(&pool, "bob").await;
  let moderator = create_user(&pool, "carol").await;
  accounts::grant_permission(&pool, moderator.id, Permission::DeleteReview)
    .await
    .unwrap();

  let cat = create_category(&pool, "Audio").await;
  let product = create_product(&pool, &cat, "Speaker", Money::from_units(20)).await;
  let first = reviews::add_review(&pool, &author, product.id, &review("4", "Nice")).await.unwrap();

  assert!(matches!(
    reviews::delete_review(&pool, &stranger, first.id).await,
    Err(StoreError::PermissionDenied(_))
  ));

  let deleted = reviews::delete_review(&pool, &author, first.id).await.unwrap();
  assert_eq!(deleted.product_id, product.id);

  let second = reviews::add_review(&pool, &stranger, product.id, &review("2", "Meh")).await.unwrap();
  reviews::delete_review(&pool, &moderator, second.id).await.unwrap();
  assert!(reviews::for_product(&pool, product.id).await.unwrap().is_empty());

  assert!(matches!(
    reviews::delete_review(&pool, &author, second.id).await,
    Err(StoreError::NotFound { .. })
  ));
}
