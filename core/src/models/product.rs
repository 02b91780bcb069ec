// storefront/src/models/product.rs

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: String,
  #[sqlx(rename = "price_cents")]
  pub price: Money,
  pub stock: i64,
  pub category_id: i64,
  pub image: Option<String>, // Relative path or absolute URL
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// Column list shared by every product query so row decoding stays in sync.
  pub const COLUMNS: &'static str =
    "id, name, description, price_cents, stock, category_id, image, created_at, updated_at";
}
