// storefront/src/models/order.rs

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// pending -> processing | cancelled, processing -> shipped | cancelled,
  /// shipped -> delivered. Delivered and cancelled are terminal.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Processing) | (Pending, Cancelled) | (Processing, Shipped) | (Processing, Cancelled) | (Shipped, Delivered)
    )
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "processing" => Ok(OrderStatus::Processing),
      "shipped" => Ok(OrderStatus::Shipped),
      "delivered" => Ok(OrderStatus::Delivered),
      "cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(format!("unknown order status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  pub full_name: String,
  pub address: String,
  pub phone: String,
  #[sqlx(rename = "total_price_cents")]
  pub total_price: Money, // Frozen at checkout
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub const COLUMNS: &'static str =
    "id, user_id, full_name, address, phone, total_price_cents, status, created_at, updated_at";
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderWithItemCount {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub order: Order,
  pub item_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i64,
  #[sqlx(rename = "price_cents")]
  pub price: Money, // Snapshot of the product price at checkout
}

/// An order item joined with the product name for display.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
  pub id: i64,
  pub product_id: i64,
  pub product_name: String,
  pub quantity: i64,
  pub price: Money,
  pub line_total: Money,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_graph() {
    use OrderStatus::*;
    assert!(Pending.can_transition_to(Processing));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Processing.can_transition_to(Shipped));
    assert!(Shipped.can_transition_to(Delivered));
    assert!(!Pending.can_transition_to(Delivered));
    assert!(!Shipped.can_transition_to(Cancelled));
    assert!(!Delivered.can_transition_to(Pending));
    assert!(!Cancelled.can_transition_to(Processing));
    assert!(Delivered.is_terminal() && Cancelled.is_terminal());
  }

  #[test]
  fn status_round_trips_through_str() {
    for status in ["pending", "processing", "shipped", "delivered", "cancelled"] {
      assert_eq!(status.parse::<OrderStatus>().unwrap().as_str(), status);
    }
    assert!("refunded".parse::<OrderStatus>().is_err());
  }
}
