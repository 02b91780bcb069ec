// storefront_app/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront::{catalog, StoreError};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::flash::Flash;
use crate::web::session::CurrentUser;

#[instrument(name = "handler::home", skip_all)]
pub async fn home_handler(
  app_state: web::Data<AppState>,
  current: CurrentUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let page = catalog::home(&app_state.db_pool).await?;
  Ok(flash.render(current.user(), &page))
}

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub page: Option<String>,
  pub category: Option<String>,
}

impl ListProductsQuery {
  fn page_number(&self) -> Result<i64, StoreError> {
    match self.page.as_deref().map(str::trim) {
      None | Some("") => Ok(1),
      Some(raw) => raw.parse::<i64>().map_err(|_| StoreError::not_found("Page", 0)),
    }
  }

  fn category_id(&self) -> Result<Option<i64>, StoreError> {
    match self.category.as_deref().map(str::trim) {
      None | Some("") => Ok(None),
      Some(raw) => raw
        .parse::<i64>()
        .map(Some)
        .map_err(|_| StoreError::validation("Invalid category.")),
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state, current, flash))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
  current: CurrentUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let page = query_params.page_number()?;
  let category_id = query_params.category_id()?;
  let listing = catalog::list_products(&app_state.db_pool, page, category_id).await?;
  info!(
    page = listing.page,
    num_pages = listing.num_pages,
    count = listing.products.len(),
    "Product page listed."
  );
  Ok(flash.render(current.user(), &listing))
}

#[instrument(name = "handler::product_detail", skip(app_state, current, flash), fields(product_id = %path.as_ref()))]
pub async fn product_detail_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  current: CurrentUser,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let detail = catalog::product_detail(&app_state.db_pool, product_id).await?;
  Ok(flash.render(current.user(), &detail))
}
