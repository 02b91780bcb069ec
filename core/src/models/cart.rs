// storefront/src/models/cart.rs

use crate::error::Result;
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
  pub id: i64,
  pub user_id: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CartItem {
  pub id: i64,
  pub cart_id: i64,
  pub product_id: i64,
  pub quantity: i64,
}

/// A cart item joined with the live product row; prices are the current ones.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub item_id: i64,
  pub product_id: i64,
  pub product_name: String,
  pub image: Option<String>,
  pub unit_price: Money,
  pub quantity: i64,
  // Computed in Rust so an oversized product cannot spill into a REAL column.
  #[sqlx(skip)]
  pub line_total: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
  pub cart_id: i64,
  pub lines: Vec<CartLine>,
  pub total_price: Money,
  pub total_items: i64,
}

impl CartSummary {
  pub fn from_lines(cart_id: i64, lines: Vec<CartLine>) -> Result<Self> {
    let total_price = Money::checked_sum(lines.iter().map(|l| l.line_total))?;
    let total_items = lines.iter().map(|l| l.quantity).sum();
    Ok(Self {
      cart_id,
      lines,
      total_price,
      total_items,
    })
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}
