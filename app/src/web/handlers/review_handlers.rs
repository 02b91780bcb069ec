// storefront_app/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use storefront::reviews::{self, ReviewForm};
use storefront::StoreError;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::paths;
use crate::web::session::AuthenticatedUser;

#[instrument(name = "handler::add_review", skip(app_state, form, auth_user, flash), fields(user_id = auth_user.0.id, product_id = %path.as_ref()))]
pub async fn add_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  form: web::Form<ReviewForm>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match reviews::add_review(&app_state.db_pool, &auth_user.0, product_id, &form).await {
    Ok(_) => flash.success("Your review was added!"),
    Err(StoreError::AlreadyReviewed { .. }) => flash.error("You have already reviewed this product."),
    Err(StoreError::Validation(message)) => flash.error(message),
    Err(other) => return Err(other.into()),
  }
  Ok(flash.redirect(&paths::product(product_id)))
}

#[instrument(name = "handler::delete_review", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, review_id = %path.as_ref()))]
pub async fn delete_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  match reviews::delete_review(&app_state.db_pool, &auth_user.0, path.into_inner()).await {
    Ok(review) => {
      flash.success("Review deleted.");
      Ok(flash.redirect(&paths::product(review.product_id)))
    }
    Err(StoreError::PermissionDenied(message)) => {
      flash.error(message);
      Ok(flash.redirect(paths::HOME))
    }
    Err(other) => Err(other.into()),
  }
}
