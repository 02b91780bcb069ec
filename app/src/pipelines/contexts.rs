// storefront_app/src/pipelines/contexts.rs

//! Data the pipelines run over. Handlers receive it wrapped in
//! `orka::ContextData`.

use crate::state::AppState;
use parking_lot::Mutex;
use sqlx::{Sqlite, Transaction};
use storefront::checkout::{CheckoutForm, PendingCheckout};
use storefront::{FormErrors, Order};

/// How a checkout run ended, read back by the handler.
#[derive(Debug)]
pub enum CheckoutOutcome {
  Placed(Order),
  EmptyCart,
  InvalidForm(FormErrors),
}

pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user_id: i64,
  pub form: CheckoutForm,
  // Opened by `load_cart`, committed by `clear_cart`. Steps take it out
  // before awaiting and put it back afterwards; dropping it rolls back.
  pub tx: Mutex<Option<Transaction<'static, Sqlite>>>,
  pub pending: Option<PendingCheckout>,
  pub details: Option<CheckoutForm>,
  pub order: Option<Order>,
  pub outcome: Option<CheckoutOutcome>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, user_id: i64, form: CheckoutForm) -> Self {
    Self {
      app_state,
      user_id,
      form,
      tx: Mutex::new(None),
      pending: None,
      details: None,
      order: None,
      outcome: None,
    }
  }
}
