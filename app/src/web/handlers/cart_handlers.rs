// storefront_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::cart::{self, CartUpdate};
use storefront::StoreError;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::session::AuthenticatedUser;
use crate::web::{is_ajax, paths};

#[instrument(name = "handler::cart_detail", skip_all, fields(user_id = auth_user.0.id))]
pub async fn cart_detail_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let summary = cart::summary(&app_state.db_pool, auth_user.0.id).await?;
  Ok(flash.render(Some(&auth_user.0), json!({ "cart": summary })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req, auth_user, flash),
  fields(user_id = auth_user.0.id, product_id = %path.as_ref())
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let added = cart::add_product(&app_state.db_pool, user.id, path.into_inner()).await?;
  let message = format!("Added \"{}\" to your cart.", added.product_name);
  info!(quantity = added.item.quantity, "Add to cart succeeded.");

  if is_ajax(&req) {
    let cart_total = cart::total_items(&app_state.db_pool, user.id).await?;
    return Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "cart_total": cart_total,
      "message": message,
    })));
  }
  flash.success(message);
  Ok(flash.redirect(paths::CART))
}

#[derive(Deserialize, Debug)]
pub struct QuantityForm {
  pub quantity: Option<String>,
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, req, form, auth_user, flash),
  fields(user_id = auth_user.0.id, item_id = %path.as_ref())
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<i64>,
  form: web::Form<QuantityForm>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let item_id = path.into_inner();
  let ajax = is_ajax(&req);

  let quantity = match cart::parse_quantity(form.quantity.as_deref()) {
    Ok(quantity) => quantity,
    Err(StoreError::Validation(message)) => {
      warn!(raw = ?form.quantity, "Rejected cart quantity.");
      if ajax {
        return Ok(HttpResponse::BadRequest().json(json!({ "success": false, "message": message })));
      }
      flash.error(message);
      return Ok(flash.redirect(paths::CART));
    }
    Err(other) => return Err(other.into()),
  };

  let outcome = cart::update_item(&app_state.db_pool, user.id, item_id, quantity).await?;
  let message = match &outcome {
    CartUpdate::Updated { .. } => "Quantity updated.".to_string(),
    CartUpdate::Removed { product_name, .. } => format!("Removed \"{}\" from your cart.", product_name),
  };

  if ajax {
    let summary = cart::summary(&app_state.db_pool, user.id).await?;
    return Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "update": outcome,
      "cart_total": summary.total_items,
      "cart_price": summary.total_price,
      "message": message,
    })));
  }
  flash.success(message);
  Ok(flash.redirect(paths::CART))
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, req, auth_user, flash),
  fields(user_id = auth_user.0.id, item_id = %path.as_ref())
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let product_name = cart::remove_item(&app_state.db_pool, user.id, path.into_inner()).await?;
  let message = format!("Removed \"{}\" from your cart.", product_name);

  if is_ajax(&req) {
    let cart_total = cart::total_items(&app_state.db_pool, user.id).await?;
    return Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "cart_total": cart_total,
      "message": message,
    })));
  }
  flash.success(message);
  Ok(flash.redirect(paths::CART))
}
