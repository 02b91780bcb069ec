// storefront/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Review {
  pub id: i64,
  pub product_id: i64,
  pub user_id: i64,
  pub rating: i64, // 1..=5
  pub comment: String,
  pub created_at: DateTime<Utc>,
}

/// A review joined with the author's username, as shown on a product page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
  pub id: i64,
  pub user_id: i64,
  pub username: String,
  pub rating: i64,
  pub comment: String,
  pub created_at: DateTime<Utc>,
}
