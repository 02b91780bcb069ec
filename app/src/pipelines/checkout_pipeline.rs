// storefront_app/src/pipelines/checkout_pipeline.rs

//! Checkout as an Orka pipeline:
//! `load_cart -> validate_checkout_form -> persist_order -> clear_cart`.
//!
//! One transaction spans all four steps. It is opened by `load_cart` and
//! committed only by `clear_cart`, so a failure or a stop in between leaves
//! the database as it was.

use crate::errors::AppError;
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutOutcome};
use orka::{ContextData, Orka, Pipeline, PipelineControl};
use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use storefront::checkout;
use storefront::StoreError;
use tracing::{info, instrument, warn};

pub const STEP_LOAD_CART: &str = "load_cart";
pub const STEP_VALIDATE_FORM: &str = "validate_checkout_form";
pub const STEP_PERSIST_ORDER: &str = "persist_order";
pub const STEP_CLEAR_CART: &str = "clear_cart";

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    (STEP_LOAD_CART, false, None),
    (STEP_VALIDATE_FORM, false, None),
    (STEP_PERSIST_ORDER, false, None),
    (STEP_CLEAR_CART, false, None),
  ]);

  p.on_root(STEP_LOAD_CART, |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(load_cart(ctx_data))
  });
  p.on_root(STEP_VALIDATE_FORM, |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(validate_checkout_form(ctx_data))
  });
  p.on_root(STEP_PERSIST_ORDER, |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(persist_order(ctx_data))
  });
  p.on_root(STEP_CLEAR_CART, |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(clear_cart(ctx_data))
  });
  p
}

pub fn register_checkout_pipeline(orka_registry: &Arc<Orka<AppError>>) {
  orka_registry.register_pipeline(build_checkout_pipeline());
}

fn take_tx(ctx_data: &ContextData<CheckoutCtxData>) -> Result<Transaction<'static, Sqlite>, AppError> {
  ctx_data
    .write()
    .tx
    .get_mut()
    .take()
    .ok_or_else(|| AppError::Internal("Checkout transaction is not open.".to_string()))
}

fn put_tx(ctx_data: &ContextData<CheckoutCtxData>, tx: Transaction<'static, Sqlite>) {
  *ctx_data.write().tx.get_mut() = Some(tx);
}

#[instrument(name = "checkout_step::load_cart", skip_all)]
async fn load_cart(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (pool, user_id) = {
    let guard = ctx_data.read();
    (guard.app_state.db_pool.clone(), guard.user_id)
  };

  let mut tx = pool.begin().await?;
  match checkout::load_cart(&mut tx, user_id).await {
    Ok(pending) => {
      let mut guard = ctx_data.write();
      guard.pending = Some(pending);
      *guard.tx.get_mut() = Some(tx);
      Ok(PipelineControl::Continue)
    }
    Err(StoreError::EmptyCart) => {
      ctx_data.write().outcome = Some(CheckoutOutcome::EmptyCart);
      Ok(PipelineControl::Stop)
    }
    Err(other) => Err(other.into()),
  }
}

#[instrument(name = "checkout_step::validate_checkout_form", skip_all)]
async fn validate_checkout_form(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let cleaned = ctx_data.read().form.clean();
  match cleaned {
    Ok(details) => {
      ctx_data.write().details = Some(details);
      Ok(PipelineControl::Continue)
    }
    Err(errors) => {
      warn!(fields = ?errors, "Checkout form rejected.");
      // Hand the connection back now; the caller re-reads the cart to render the form.
      take_tx(&ctx_data)?.rollback().await?;
      ctx_data.write().outcome = Some(CheckoutOutcome::InvalidForm(errors));
      Ok(PipelineControl::Stop)
    }
  }
}

#[instrument(name = "checkout_step::persist_order", skip_all)]
async fn persist_order(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (user_id, details, pending) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.details.clone(), guard.pending.clone())
  };
  let (details, pending) = details
    .zip(pending)
    .ok_or_else(|| AppError::Internal("Checkout reached persist_order without a cart or details.".to_string()))?;

  let mut tx = take_tx(&ctx_data)?;
  let order = checkout::insert_order(&mut tx, user_id, &details, &pending).await?;
  put_tx(&ctx_data, tx);
  ctx_data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::clear_cart", skip_all)]
async fn clear_cart(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (cart_id, items, order) = {
    let guard = ctx_data.read();
    (
      guard.pending.as_ref().map(|p| p.cart_id),
      guard.pending.as_ref().map_or(0, |p| p.lines.len()),
      guard.order.clone(),
    )
  };
  let (cart_id, order) = cart_id
    .zip(order)
    .ok_or_else(|| AppError::Internal("Checkout reached clear_cart without an order.".to_string()))?;

  let mut tx = take_tx(&ctx_data)?;
  checkout::clear_cart(&mut tx, cart_id).await?;
  tx.commit().await?;

  info!(order_id = order.id, items, total = %order.total_price, "Order placed.");
  ctx_data.write().outcome = Some(CheckoutOutcome::Placed(order));
  Ok(PipelineControl::Continue)
}
