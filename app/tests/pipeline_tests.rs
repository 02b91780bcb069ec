// tests/pipeline_tests.rs
mod common;
use common::*;

use orka::{ContextData, PipelineResult};
use storefront::checkout::CheckoutForm;
use storefront::{Money, SqlitePool, StoreError};
use storefront_app::errors::AppError;
use storefront_app::pipelines::contexts::{CheckoutCtxData, CheckoutOutcome};
use storefront_app::state::AppState;

fn delivery() -> CheckoutForm {
  CheckoutForm {
    full_name: "Alice Example".into(),
    address: "1 Road".into(),
    phone: "0500000000".into(),
  }
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
  sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn run_checkout(
  state: &AppState,
  user_id: i64,
  form: CheckoutForm,
) -> (Result<PipelineResult, AppError>, ContextData<CheckoutCtxData>) {
  let ctx = ContextData::new(CheckoutCtxData::new(state.clone(), user_id, form));
  let result = state.orka_instance.run(ctx.clone()).await;
  (result, ctx)
}

#[actix_rt::test]
async fn completed_run_places_the_order_and_empties_the_cart() {
  let state = test_state().await;
  let user = create_user(&state.db_pool, "alice").await;
  let a = create_product(&state.db_pool, "Product A", Money::from_units(10)).await;
  let b = create_product(&state.db_pool, "Product B", Money::from_units(5)).await;
  storefront::cart::add_product(&state.db_pool, user.id, a.id).await.unwrap();
  storefront::cart::add_product(&state.db_pool, user.id, a.id).await.unwrap();
  storefront::cart::add_product(&state.db_pool, user.id, b.id).await.unwrap();

  let (result, ctx) = run_checkout(&state, user.id, delivery()).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let order = match ctx.write().outcome.take() {
    Some(CheckoutOutcome::Placed(order)) => order,
    other => panic!("expected a placed order, got {:?}", other),
  };
  assert_eq!(order.total_price, Money::from_units(25));
  assert!(ctx.read().tx.lock().is_none());

  assert_eq!(count(&state.db_pool, "orders").await, 1);
  assert_eq!(count(&state.db_pool, "order_items").await, 2);
  assert_eq!(storefront::cart::total_items(&state.db_pool, user.id).await.unwrap(), 0);
}

#[actix_rt::test]
async fn empty_cart_stops_before_validating() {
  let state = test_state().await;
  let user = create_user(&state.db_pool, "alice").await;

  let (result, ctx) = run_checkout(&state, user.id, CheckoutForm::default()).await;
  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert!(matches!(ctx.read().outcome, Some(CheckoutOutcome::EmptyCart)));
  assert_eq!(count(&state.db_pool, "orders").await, 0);
}

#[actix_rt::test]
async fn invalid_form_stops_and_rolls_back() {
  let state = test_state().await;
  let user = create_user(&state.db_pool, "alice").await;
  let a = create_product(&state.db_pool, "Product A", Money::from_units(10)).await;
  storefront::cart::add_product(&state.db_pool, user.id, a.id).await.unwrap();

  let form = CheckoutForm {
    full_name: "Alice".into(),
    ..CheckoutForm::default()
  };
  let (result, ctx) = run_checkout(&state, user.id, form).await;
  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  match ctx.write().outcome.take() {
    Some(CheckoutOutcome::InvalidForm(errors)) => {
      assert!(errors.has("address"));
      assert!(errors.has("phone"));
    }
    other => panic!("expected InvalidForm, got {:?}", other),
  }
  assert!(ctx.read().tx.lock().is_none());

  assert_eq!(count(&state.db_pool, "orders").await, 0);
  assert_eq!(storefront::cart::total_items(&state.db_pool, user.id).await.unwrap(), 1);
}

#[actix_rt::test]
async fn failing_step_leaves_no_partial_order() {
  let state = test_state().await;
  let user = create_user(&state.db_pool, "alice").await;
  let a = create_product(&state.db_pool, "Product A", Money::from_units(10)).await;
  let b = create_product(&state.db_pool, "Product B", Money::from_units(5)).await;
  storefront::cart::add_product(&state.db_pool, user.id, a.id).await.unwrap();
  storefront::cart::add_product(&state.db_pool, user.id, b.id).await.unwrap();
  sqlx::query(&format!(
    "CREATE TRIGGER reject_product_b BEFORE INSERT ON order_items \
     WHEN NEW.product_id = {} BEGIN SELECT RAISE(ABORT, 'product b rejected'); END",
    b.id
  ))
  .execute(&state.db_pool)
  .await
  .unwrap();

  let (result, ctx) = run_checkout(&state, user.id, delivery()).await;
  assert!(
    matches!(result, Err(AppError::Store(StoreError::Database(_)))),
    "got {:?}",
    result
  );
  assert!(ctx.read().outcome.is_none());

  assert_eq!(count(&state.db_pool, "orders").await, 0);
  assert_eq!(count(&state.db_pool, "order_items").await, 0);
  assert_eq!(storefront::cart::total_items(&state.db_pool, user.id).await.unwrap(), 2);
}
