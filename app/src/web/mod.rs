// storefront_app/src/web/mod.rs

pub mod flash;
pub mod handlers;
pub mod routes;
pub mod session;

use actix_web::HttpRequest;

pub use routes::configure_app_routes;

/// True for requests sent by the storefront's own scripts.
pub fn is_ajax(req: &HttpRequest) -> bool {
  req
    .headers()
    .get("X-Requested-With")
    .and_then(|v| v.to_str().ok())
    .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    .unwrap_or(false)
}

/// Paths that handlers redirect to.
pub mod paths {
  pub const HOME: &str = "/";
  pub const PRODUCTS: &str = "/products/";
  pub const CART: &str = "/cart/";
  pub const ORDERS: &str = "/orders/";
  pub const LOGIN: &str = "/login/";

  pub fn product(product_id: i64) -> String {
    format!("/products/{}/", product_id)
  }

  pub fn order(order_id: i64) -> String {
    format!("/orders/{}/", order_id)
  }
}
