// storefront/src/checkout.rs

//! Turns a user's cart into an order.
//!
//! The order row, every order item and the emptied cart are written in one
//! transaction: either the whole order exists afterwards or nothing changed.

use crate::cart;
use crate::error::{Result, StoreError};
use crate::forms::{self, FormErrors};
use crate::models::{CartLine, Order, OrderStatus, User};
use crate::money::Money;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument, warn};

pub const FULL_NAME_MAX_CHARS: usize = 200;
pub const PHONE_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutForm {
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub phone: String,
}

impl CheckoutForm {
  /// Initial values shown on the checkout page.
  pub fn initial_for(user: &User) -> Self {
    Self {
      full_name: user.username.clone(),
      ..Self::default()
    }
  }

  pub fn clean(&self) -> Result<CheckoutForm, FormErrors> {
    let mut errors = FormErrors::new();
    let full_name = forms::required(&mut errors, "full_name", &self.full_name);
    forms::max_chars(&mut errors, "full_name", &full_name, FULL_NAME_MAX_CHARS);
    let address = forms::required(&mut errors, "address", &self.address);
    let phone = forms::required(&mut errors, "phone", &self.phone);
    forms::max_chars(&mut errors, "phone", &phone, PHONE_MAX_CHARS);
    errors.finish(CheckoutForm {
      full_name,
      address,
      phone,
    })
  }
}

/// A non-empty cart read inside the checkout transaction.
#[derive(Debug, Clone)]
pub struct PendingCheckout {
  pub cart_id: i64,
  pub lines: Vec<CartLine>,
  pub total_price: Money,
}

/// Loads `user_id`'s cart and its total. Fails with `EmptyCart` when it has
/// no items.
pub async fn load_cart(conn: &mut SqliteConnection, user_id: i64) -> Result<PendingCheckout> {
  let cart = cart::get_or_create_cart(&mut *conn, user_id).await?;
  let lines = cart::lines(&mut *conn, cart.id).await?;
  if lines.is_empty() {
    warn!("Checkout attempted with an empty cart.");
    return Err(StoreError::EmptyCart);
  }
  let total_price = Money::checked_sum(lines.iter().map(|l| l.line_total))?;
  Ok(PendingCheckout {
    cart_id: cart.id,
    lines,
    total_price,
  })
}

/// Writes the order row and one item per cart line, snapshotting prices.
/// `details` must already be cleaned.
pub async fn insert_order(
  conn: &mut SqliteConnection,
  user_id: i64,
  details: &CheckoutForm,
  pending: &PendingCheckout,
) -> Result<Order> {
  let now = Utc::now();
  let order = sqlx::query_as::<_, Order>(&format!(
    "INSERT INTO orders (user_id, full_name, address, phone, total_price_cents, status, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
    Order::COLUMNS
  ))
  .bind(user_id)
  .bind(&details.full_name)
  .bind(&details.address)
  .bind(&details.phone)
  .bind(pending.total_price)
  .bind(OrderStatus::Pending)
  .bind(now)
  .bind(now)
  .fetch_one(&mut *conn)
  .await?;

  for line in &pending.lines {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, price_cents) VALUES (?, ?, ?, ?)")
      .bind(order.id)
      .bind(line.product_id)
      .bind(line.quantity)
      .bind(line.unit_price)
      .execute(&mut *conn)
      .await?;
  }
  Ok(order)
}

/// Empties the cart after an order. The cart row itself survives.
pub async fn clear_cart(conn: &mut SqliteConnection, cart_id: i64) -> Result<()> {
  sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
    .bind(cart_id)
    .execute(&mut *conn)
    .await?;
  Ok(())
}

/// Places an order for everything in `user_id`'s cart.
///
/// Fails with `EmptyCart` (creating nothing) when the cart has no items, and
/// with `InvalidForm` when the delivery details do not validate.
#[instrument(name = "checkout::place_order", skip(pool, form))]
pub async fn place_order(pool: &SqlitePool, user_id: i64, form: &CheckoutForm) -> Result<Order> {
  let mut tx = pool.begin().await?;

  let pending = load_cart(&mut tx, user_id).await?;
  let details = form.clean()?;
  let order = insert_order(&mut tx, user_id, &details, &pending).await?;
  clear_cart(&mut tx, pending.cart_id).await?;

  tx.commit().await?;
  info!(
    order_id = order.id,
    items = pending.lines.len(),
    total = %order.total_price,
    "Order placed."
  );
  Ok(order)
}
