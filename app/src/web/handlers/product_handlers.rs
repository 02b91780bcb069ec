// storefront_app/src/web/handlers/product_handlers.rs

//! Staff-only product editing. Each form page checks the permission up front;
//! a user without it gets an error message and is sent home.

use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront::catalog::{self, ProductForm};
use storefront::{accounts, FormErrors, Permission, StoreError, User};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::paths;
use crate::web::session::AuthenticatedUser;

fn denied_message(permission: Permission) -> &'static str {
  match permission {
    Permission::AddProduct => "Sorry, you do not have permission to add products.",
    Permission::ChangeProduct => "Sorry, you do not have permission to edit products.",
    _ => "Sorry, you do not have permission to delete products.",
  }
}

fn deny(mut flash: Flash, permission: Permission) -> HttpResponse {
  warn!(permission = %permission, "Product edit denied.");
  flash.error(denied_message(permission));
  flash.redirect(paths::HOME)
}

async fn form_page(
  app_state: &AppState,
  flash: Flash,
  user: &User,
  form: &ProductForm,
  errors: &FormErrors,
  product_id: Option<i64>,
) -> Result<HttpResponse, AppError> {
  let categories = catalog::list_categories(&app_state.db_pool).await?;
  Ok(flash.render(
    Some(user),
    json!({
      "product_id": product_id,
      "form": form,
      "errors": errors,
      "categories": categories,
    }),
  ))
}

#[instrument(name = "handler::add_product_page", skip_all, fields(user_id = auth_user.0.id))]
pub async fn add_product_page_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  if !accounts::has_perm(&app_state.db_pool, &user, Permission::AddProduct).await? {
    return Ok(deny(flash, Permission::AddProduct));
  }
  form_page(&app_state, flash, &user, &ProductForm::default(), &FormErrors::new(), None).await
}

#[instrument(name = "handler::add_product", skip_all, fields(user_id = auth_user.0.id))]
pub async fn add_product_handler(
  app_state: web::Data<AppState>,
  form: web::Form<ProductForm>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  match catalog::create_product(&app_state.db_pool, &user, &form).await {
    Ok(product) => {
      info!(product_id = product.id, "Product created via form.");
      flash.success("The product was added successfully!");
      Ok(flash.redirect(&paths::product(product.id)))
    }
    Err(StoreError::PermissionDenied(_)) => Ok(deny(flash, Permission::AddProduct)),
    Err(StoreError::InvalidForm(errors)) => form_page(&app_state, flash, &user, &form, &errors, None).await,
    Err(other) => Err(other.into()),
  }
}

#[instrument(name = "handler::edit_product_page", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, product_id = %path.as_ref()))]
pub async fn edit_product_page_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  if !accounts::has_perm(&app_state.db_pool, &user, Permission::ChangeProduct).await? {
    return Ok(deny(flash, Permission::ChangeProduct));
  }
  let product = catalog::get_product(&app_state.db_pool, path.into_inner()).await?;
  let form = ProductForm::from(&product);
  form_page(&app_state, flash, &user, &form, &FormErrors::new(), Some(product.id)).await
}

#[instrument(name = "handler::edit_product", skip(app_state, form, auth_user, flash), fields(user_id = auth_user.0.id, product_id = %path.as_ref()))]
pub async fn edit_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  form: web::Form<ProductForm>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  let product_id = path.into_inner();
  match catalog::update_product(&app_state.db_pool, &user, product_id, &form).await {
    Ok(product) => {
      flash.success("The product was updated successfully!");
      Ok(flash.redirect(&paths::product(product.id)))
    }
    Err(StoreError::PermissionDenied(_)) => Ok(deny(flash, Permission::ChangeProduct)),
    Err(StoreError::InvalidForm(errors)) => {
      form_page(&app_state, flash, &user, &form, &errors, Some(product_id)).await
    }
    Err(other) => Err(other.into()),
  }
}

#[instrument(name = "handler::delete_product_page", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, product_id = %path.as_ref()))]
pub async fn delete_product_page_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let user = auth_user.0;
  if !accounts::has_perm(&app_state.db_pool, &user, Permission::DeleteProduct).await? {
    return Ok(deny(flash, Permission::DeleteProduct));
  }
  let product = catalog::get_product(&app_state.db_pool, path.into_inner()).await?;
  Ok(flash.render(Some(&user), json!({ "product": product, "confirm": true })))
}

#[instrument(name = "handler::delete_product", skip(app_state, auth_user, flash), fields(user_id = auth_user.0.id, product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
  mut flash: Flash,
) -> Result<HttpResponse, AppError> {
  match catalog::delete_product(&app_state.db_pool, &auth_user.0, path.into_inner()).await {
    Ok(_) => {
      flash.success("The product was deleted successfully!");
      Ok(flash.redirect(paths::PRODUCTS))
    }
    Err(StoreError::PermissionDenied(_)) => Ok(deny(flash, Permission::DeleteProduct)),
    Err(other) => Err(other.into()),
  }
}
