// storefront_app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront::orders;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::paths;
use crate::web::session::AuthenticatedUser;

#[instrument(name = "handler::order_list", skip_all, fields(user_id = auth_user.0.id))]
pub async fn order_list_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let list = orders::list_for_user(&app_state.db_pool, auth_user.0.id).await?;
  Ok(flash.render(Some(&auth_user.0), json!({ "orders": list })))
}

#[instrument(name = "handler::order_detail", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, order_id = %path.as_ref()))]
pub async fn order_detail_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let detail = orders::detail_for_user(&app_state.db_pool, auth_user.0.id, path.into_inner()).await?;
  Ok(flash.render(Some(&auth_user.0), &detail))
}

/// Confirmation page shown before an owner cancels.
#[instrument(name = "handler::cancel_order_page", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, order_id = %path.as_ref()))]
pub async fn cancel_order_page_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let order = orders::get_for_user(&app_state.db_pool, auth_user.0.id, path.into_inner()).await?;
  Ok(flash.render(Some(&auth_user.0), json!({ "order": order, "confirm": true })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, order_id = %path.as_ref()))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  orders::cancel(&app_state.db_pool, auth_user.0.id, path.into_inner()).await?;
  flash.success("Order cancelled.");
  Ok(flash.redirect(paths::ORDERS))
}
