// storefront/src/cart.rs

//! The per-user cart. Totals are recomputed from the live product rows on
//! every read.

use crate::error::{Result, StoreError};
use crate::models::{Cart, CartItem, CartLine, CartSummary};
use chrono::Utc;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

const CART_COLUMNS: &str = "id, user_id, created_at, updated_at";

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

/// Returns the user's cart, creating it on first use.
pub async fn get_or_create_cart<'e, E>(executor: E, user_id: i64) -> Result<Cart>
where
  E: sqlx::Executor<'e, Database = Sqlite>,
{
  let now = Utc::now();
  // The no-op update makes RETURNING yield the existing row on conflict.
  let cart = sqlx::query_as::<_, Cart>(&format!(
    "INSERT INTO carts (user_id, created_at, updated_at) VALUES (?, ?, ?) \
     ON CONFLICT(user_id) DO UPDATE SET user_id = excluded.user_id RETURNING {}",
    CART_COLUMNS
  ))
  .bind(user_id)
  .bind(now)
  .bind(now)
  .fetch_one(executor)
  .await?;
  Ok(cart)
}

pub(crate) async fn lines<'e, E>(executor: E, cart_id: i64) -> Result<Vec<CartLine>>
where
  E: sqlx::Executor<'e, Database = Sqlite>,
{
  let mut lines = sqlx::query_as::<_, CartLine>(
    "SELECT ci.id AS item_id, ci.product_id, p.name AS product_name, p.image, \
            p.price_cents AS unit_price, ci.quantity \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id \
     WHERE ci.cart_id = ? ORDER BY ci.id ASC",
  )
  .bind(cart_id)
  .fetch_all(executor)
  .await?;
  for line in &mut lines {
    line.line_total = line.unit_price.checked_mul(line.quantity)?;
  }
  Ok(lines)
}

/// The user's cart lines with `total_price` and `total_items`.
#[instrument(name = "cart::summary", skip(pool))]
pub async fn summary(pool: &SqlitePool, user_id: i64) -> Result<CartSummary> {
  let cart = get_or_create_cart(pool, user_id).await?;
  let lines = lines(pool, cart.id).await?;
  CartSummary::from_lines(cart.id, lines)
}

/// Sum of quantities in the user's cart, without loading the lines.
pub async fn total_items(pool: &SqlitePool, user_id: i64) -> Result<i64> {
  let total: i64 = sqlx::query_scalar(
    "SELECT COALESCE(SUM(ci.quantity), 0) FROM cart_items ci JOIN carts c ON c.id = ci.cart_id WHERE c.user_id = ?",
  )
  .bind(user_id)
  .fetch_one(pool)
  .await?;
  Ok(total)
}

#[derive(Debug, Clone, Serialize)]
pub struct AddedToCart {
  pub item: CartItem,
  pub product_name: String,
  pub created: bool,
}

/// Adds one unit of `product_id`: a new line at quantity 1, or +1 on the
/// existing line for that product.
#[instrument(name = "cart::add_product", skip(pool))]
pub async fn add_product(pool: &SqlitePool, user_id: i64, product_id: i64) -> Result<AddedToCart> {
  let product_name: Option<String> = sqlx::query_scalar("SELECT name FROM products WHERE id = ?")
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  let product_name = product_name.ok_or_else(|| StoreError::not_found("Product", product_id))?;

  let cart = get_or_create_cart(pool, user_id).await?;
  let item = sqlx::query_as::<_, CartItem>(
    "INSERT INTO cart_items (cart_id, product_id, quantity) VALUES (?, ?, 1) \
     ON CONFLICT(cart_id, product_id) DO UPDATE SET quantity = MIN(cart_items.quantity + 1, ?) \
     RETURNING id, cart_id, product_id, quantity",
  )
  .bind(cart.id)
  .bind(product_id)
  .bind(MAX_QUANTITY)
  .fetch_one(pool)
  .await?;
  touch(pool, cart.id).await?;

  let created = item.quantity == 1;
  info!(item_id = item.id, quantity = item.quantity, created, "Product added to cart.");
  Ok(AddedToCart {
    item,
    product_name,
    created,
  })
}

/// Loads an item only if it sits in `user_id`'s cart.
async fn owned_item(pool: &SqlitePool, user_id: i64, item_id: i64) -> Result<(CartItem, String)> {
  let row: Option<(i64, i64, i64, i64, String)> = sqlx::query_as(
    "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, p.name \
     FROM cart_items ci JOIN carts c ON c.id = ci.cart_id JOIN products p ON p.id = ci.product_id \
     WHERE ci.id = ? AND c.user_id = ?",
  )
  .bind(item_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  let (id, cart_id, product_id, quantity, product_name) = row.ok_or_else(|| StoreError::not_found("CartItem", item_id))?;
  Ok((
    CartItem {
      id,
      cart_id,
      product_id,
      quantity,
    },
    product_name,
  ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CartUpdate {
  Updated { item_id: i64, quantity: i64 },
  Removed { item_id: i64, product_name: String },
}

/// Sets the quantity of one of the user's items; zero or less removes it.
#[instrument(name = "cart::update_item", skip(pool))]
pub async fn update_item(pool: &SqlitePool, user_id: i64, item_id: i64, quantity: i64) -> Result<CartUpdate> {
  if quantity > MAX_QUANTITY {
    return Err(StoreError::validation(INVALID_QUANTITY));
  }
  let (item, product_name) = owned_item(pool, user_id, item_id).await?;

  let outcome = if quantity > 0 {
    sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
      .bind(quantity)
      .bind(item.id)
      .execute(pool)
      .await?;
    CartUpdate::Updated {
      item_id: item.id,
      quantity,
    }
  } else {
    sqlx::query("DELETE FROM cart_items WHERE id = ?")
      .bind(item.id)
      .execute(pool)
      .await?;
    CartUpdate::Removed {
      item_id: item.id,
      product_name,
    }
  };
  touch(pool, item.cart_id).await?;
  debug!(?outcome, "Cart item updated.");
  Ok(outcome)
}

/// Removes one of the user's items and returns the product's name.
#[instrument(name = "cart::remove_item", skip(pool))]
pub async fn remove_item(pool: &SqlitePool, user_id: i64, item_id: i64) -> Result<String> {
  let (item, product_name) = owned_item(pool, user_id, item_id).await?;
  sqlx::query("DELETE FROM cart_items WHERE id = ?")
    .bind(item.id)
    .execute(pool)
    .await?;
  touch(pool, item.cart_id).await?;
  info!(item_id, "Cart item removed.");
  Ok(product_name)
}

async fn touch<'e, E>(executor: E, cart_id: i64) -> Result<()>
where
  E: sqlx::Executor<'e, Database = Sqlite>,
{
  sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
    .bind(Utc::now())
    .bind(cart_id)
    .execute(executor)
    .await?;
  Ok(())
}

const INVALID_QUANTITY: &str = "Invalid quantity.";

/// Parses a posted quantity. Anything but an integer up to `MAX_QUANTITY` is
/// rejected.
pub fn parse_quantity(raw: Option<&str>) -> Result<i64> {
  match raw.map(str::trim) {
    None | Some("") => Ok(1),
    Some(value) => match value.parse::<i64>() {
      Ok(quantity) if quantity <= MAX_QUANTITY => Ok(quantity),
      _ => Err(StoreError::validation(INVALID_QUANTITY)),
    },
  }
}
