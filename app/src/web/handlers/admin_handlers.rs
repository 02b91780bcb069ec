// storefront_app/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::{orders, OrderStatus, StoreError};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::session::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct StatusForm {
  pub status: String,
}

/// Staff transition of an order's status. Answers in JSON; the storefront
/// pages have no admin screens.
#[instrument(name = "handler::change_order_status", skip(app_state, auth_user), fields(user_id = auth_user.0.id, order_id = %path.as_ref()))]
pub async fn change_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  form: web::Form<StatusForm>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let next: OrderStatus = form
    .status
    .trim()
    .parse()
    .map_err(|_| StoreError::validation(format!("Unknown order status '{}'.", form.status.trim())))?;
  let order = orders::transition_status(&app_state.db_pool, &auth_user.0, path.into_inner(), next).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": format!("Order #{} is now {}.", order.id, order.status),
    "order": order,
  })))
}
