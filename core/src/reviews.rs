// storefront/src/reviews.rs

//! Product reviews. A user may review a product once; the rule lives here, not
//! in the schema.

use crate::accounts;
use crate::error::{Result, StoreError};
use crate::models::{Permission, Review, ReviewWithAuthor, User};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
  #[serde(default)]
  pub rating: Option<String>,
  #[serde(default)]
  pub comment: Option<String>,
}

/// Newest first, with the author's username.
pub async fn for_product(pool: &SqlitePool, product_id: i64) -> Result<Vec<ReviewWithAuthor>> {
  let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
    "SELECT r.id, r.user_id, u.username, r.rating, r.comment, r.created_at \
     FROM reviews r JOIN users u ON u.id = r.user_id \
     WHERE r.product_id = ? ORDER BY r.created_at DESC, r.id DESC",
  )
  .bind(product_id)
  .fetch_all(pool)
  .await?;
  Ok(reviews)
}

pub async fn get_review(pool: &SqlitePool, review_id: i64) -> Result<Review> {
  sqlx::query_as::<_, Review>("SELECT id, product_id, user_id, rating, comment, created_at FROM reviews WHERE id = ?")
    .bind(review_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Review", review_id))
}

/// Adds `user`'s review of `product_id`.
///
/// The duplicate check runs before the form is looked at, so a second attempt
/// always reports `AlreadyReviewed`.
#[instrument(name = "reviews::add_review", skip(pool, user, form), fields(user_id = user.id))]
pub async fn add_review(pool: &SqlitePool, user: &User, product_id: i64, form: &ReviewForm) -> Result<Review> {
  let product_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?")
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  if product_exists.is_none() {
    return Err(StoreError::not_found("Product", product_id));
  }

  let already: Option<i64> = sqlx::query_scalar("SELECT id FROM reviews WHERE product_id = ? AND user_id = ?")
    .bind(product_id)
    .bind(user.id)
    .fetch_optional(pool)
    .await?;
  if already.is_some() {
    warn!(product_id, "Duplicate review rejected.");
    return Err(StoreError::AlreadyReviewed {
      user_id: user.id,
      product_id,
    });
  }

  let rating = form.rating.as_deref().map(str::trim).filter(|s| !s.is_empty());
  let comment = form.comment.as_deref().map(str::trim).filter(|s| !s.is_empty());
  let (Some(rating), Some(comment)) = (rating, comment) else {
    return Err(StoreError::validation("Please fill in all fields."));
  };
  let rating: i64 = rating
    .parse()
    .ok()
    .filter(|r| (1..=5).contains(r))
    .ok_or_else(|| StoreError::validation("Rating must be a whole number from 1 to 5."))?;

  let review = sqlx::query_as::<_, Review>(
    "INSERT INTO reviews (product_id, user_id, rating, comment, created_at) VALUES (?, ?, ?, ?, ?) \
     RETURNING id, product_id, user_id, rating, comment, created_at",
  )
  .bind(product_id)
  .bind(user.id)
  .bind(rating)
  .bind(comment)
  .bind(Utc::now())
  .fetch_one(pool)
  .await?;
  info!(review_id = review.id, product_id, "Review added.");
  Ok(review)
}

/// Deletes a review if `user` wrote it or holds `products.delete_review`.
/// Returns the deleted review so the caller can redirect to its product.
#[instrument(name = "reviews::delete_review", skip(pool, user), fields(user_id = user.id))]
pub async fn delete_review(pool: &SqlitePool, user: &User, review_id: i64) -> Result<Review> {
  let review = get_review(pool, review_id).await?;

  let allowed = review.user_id == user.id || accounts::has_perm(pool, user, Permission::DeleteReview).await?;
  if !allowed {
    warn!(review_id, "Review deletion denied.");
    return Err(StoreError::PermissionDenied(
      "You are not allowed to delete this review.".to_string(),
    ));
  }

  sqlx::query("DELETE FROM reviews WHERE id = ?")
    .bind(review_id)
    .execute(pool)
    .await?;
  info!(review_id, "Review deleted.");
  Ok(review)
}
