// storefront_app/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use orka::ContextData;
use storefront::checkout::CheckoutForm;
use storefront::{cart, FormErrors};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutOutcome};
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::paths;
use crate::web::session::AuthenticatedUser;

const EMPTY_CART_MESSAGE: &str = "Your cart is empty. Add products before checking out.";

#[instrument(name = "handler::checkout_page", skip_all, fields(user_id = auth_user.0.id))]
pub async fn checkout_page_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let summary = cart::summary(&app_state.db_pool, user.id).await?;
  if summary.is_empty() {
    flash.warning(EMPTY_CART_MESSAGE);
    return Ok(flash.redirect(paths::CART));
  }
  Ok(flash.render(
    Some(&user),
    json!({
      "cart": summary,
      "form": CheckoutForm::initial_for(&user),
      "errors": FormErrors::new(),
    }),
  ))
}

#[instrument(name = "handler::checkout_submit", skip_all, fields(user_id = auth_user.0.id))]
pub async fn checkout_submit_handler(
  app_state: web::Data<AppState>,
  form: web::Form<CheckoutForm>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let form = form.into_inner();

  let orka_context_data = ContextData::new(CheckoutCtxData::new(
    app_state.get_ref().clone(),
    user.id,
    form.clone(),
  ));
  let result = app_state.orka_instance.run(orka_context_data.clone()).await?;
  let outcome = orka_context_data.write().outcome.take();

  match outcome {
    Some(CheckoutOutcome::Placed(order)) => {
      info!(order_id = order.id, "Checkout completed.");
      flash.success("Your order was placed successfully!");
      Ok(flash.redirect(&paths::order(order.id)))
    }
    Some(CheckoutOutcome::EmptyCart) => {
      flash.warning(EMPTY_CART_MESSAGE);
      Ok(flash.redirect(paths::CART))
    }
    Some(CheckoutOutcome::InvalidForm(errors)) => {
      let summary = cart::summary(&app_state.db_pool, user.id).await?;
      Ok(flash.render(
        Some(&user),
        json!({
          "cart": summary,
          "form": form,
          "errors": errors,
        }),
      ))
    }
    None => {
      warn!(?result, "Checkout pipeline finished without an outcome.");
      Err(AppError::Internal("Checkout finished without placing an order.".to_string()))
    }
  }
}
