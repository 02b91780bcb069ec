// storefront/src/orders.rs

//! Order history, owner cancellation and administrative status changes.

use crate::accounts;
use crate::error::{Result, StoreError};
use crate::models::{Order, OrderItem, OrderLine, OrderStatus, OrderWithItemCount, Permission, User};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

/// The user's orders, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<OrderWithItemCount>> {
  let orders = sqlx::query_as::<_, OrderWithItemCount>(
    "SELECT o.id, o.user_id, o.full_name, o.address, o.phone, o.total_price_cents, o.status, \
            o.created_at, o.updated_at, \
            (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS item_count \
     FROM orders o WHERE o.user_id = ? ORDER BY o.created_at DESC, o.id DESC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;
  Ok(orders)
}

pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
  let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?")
    .bind(user_id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

async fn get_order(pool: &SqlitePool, order_id: i64) -> Result<Order> {
  sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = ?", Order::COLUMNS))
    .bind(order_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Order", order_id))
}

/// An order that belongs to `user_id`. Someone else's order is reported as
/// missing, not forbidden.
pub async fn get_for_user(pool: &SqlitePool, user_id: i64, order_id: i64) -> Result<Order> {
  let order = get_order(pool, order_id).await?;
  if order.user_id != user_id {
    warn!(order_id, user_id, "Order requested by a user who does not own it.");
    return Err(StoreError::not_found("Order", order_id));
  }
  Ok(order)
}

pub async fn items(pool: &SqlitePool, order_id: i64) -> Result<Vec<OrderItem>> {
  let items = sqlx::query_as::<_, OrderItem>(
    "SELECT id, order_id, product_id, quantity, price_cents FROM order_items WHERE order_id = ? ORDER BY id ASC",
  )
  .bind(order_id)
  .fetch_all(pool)
  .await?;
  Ok(items)
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
  pub order: Order,
  pub lines: Vec<OrderLine>,
}

#[instrument(name = "orders::detail_for_user", skip(pool))]
pub async fn detail_for_user(pool: &SqlitePool, user_id: i64, order_id: i64) -> Result<OrderDetail> {
  let order = get_for_user(pool, user_id, order_id).await?;
  let lines = sqlx::query_as::<_, OrderLine>(
    "SELECT oi.id, oi.product_id, p.name AS product_name, oi.quantity, oi.price_cents AS price, \
            oi.price_cents * oi.quantity AS line_total \
     FROM order_items oi JOIN products p ON p.id = oi.product_id \
     WHERE oi.order_id = ? ORDER BY oi.id ASC",
  )
  .bind(order.id)
  .fetch_all(pool)
  .await?;
  Ok(OrderDetail { order, lines })
}

/// Owner cancellation. The order and its items are deleted outright; the
/// `cancelled` status is only reachable through [`transition_status`].
#[instrument(name = "orders::cancel", skip(pool))]
pub async fn cancel(pool: &SqlitePool, user_id: i64, order_id: i64) -> Result<()> {
  let order = get_for_user(pool, user_id, order_id).await?;
  sqlx::query("DELETE FROM orders WHERE id = ?")
    .bind(order.id)
    .execute(pool)
    .await?;
  info!(order_id, "Order cancelled by its owner (deleted).");
  Ok(())
}

/// Moves an order along one edge of the status graph. Requires
/// `orders.change_order`.
#[instrument(name = "orders::transition_status", skip(pool, actor), fields(user_id = actor.id))]
pub async fn transition_status(pool: &SqlitePool, actor: &User, order_id: i64, next: OrderStatus) -> Result<Order> {
  accounts::require_perm(pool, actor, Permission::ChangeOrder).await?;
  let order = get_order(pool, order_id).await?;

  if !order.status.can_transition_to(next) {
    warn!(from = %order.status, to = %next, "Rejected order status transition.");
    return Err(StoreError::InvalidTransition {
      from: order.status.to_string(),
      to: next.to_string(),
    });
  }

  // No row comes back if the status changed since it was read.
  let updated = sqlx::query_as::<_, Order>(&format!(
    "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING {}",
    Order::COLUMNS
  ))
  .bind(next)
  .bind(Utc::now())
  .bind(order.id)
  .bind(order.status)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| StoreError::InvalidTransition {
    from: order.status.to_string(),
    to: next.to_string(),
  })?;
  info!(order_id, from = %order.status, to = %next, "Order status changed.");
  Ok(updated)
}
