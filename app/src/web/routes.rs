// storefront_app/src/web/routes.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::error;

use crate::state::AppState;
use crate::web::handlers::{
  admin_handlers, auth_handlers, cart_handlers, catalog_handlers, checkout_handlers, order_handlers,
  product_handlers, review_handlers,
};

/// Liveness plus a trivial round trip to the database.
async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  match sqlx::query("SELECT 1").execute(&app_state.db_pool).await {
    Ok(_) => HttpResponse::Ok().json(json!({ "status": "ok" })),
    Err(e) => {
      error!(error = %e, "Health check could not reach the database.");
      HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
    }
  }
}

// Fixed segments such as `add/` are registered before `{id}` patterns.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .route("/", web::get().to(catalog_handlers::home_handler))
    // Catalog and staff product editing
    .service(
      web::scope("/products")
        .route("/", web::get().to(catalog_handlers::list_products_handler))
        .service(
          web::resource("/add/")
            .route(web::get().to(product_handlers::add_product_page_handler))
            .route(web::post().to(product_handlers::add_product_handler)),
        )
        .service(
          web::resource("/edit/{product_id:\\d+}/")
            .route(web::get().to(product_handlers::edit_product_page_handler))
            .route(web::post().to(product_handlers::edit_product_handler)),
        )
        .service(
          web::resource("/delete/{product_id:\\d+}/")
            .route(web::get().to(product_handlers::delete_product_page_handler))
            .route(web::post().to(product_handlers::delete_product_handler)),
        )
        .route(
          "/{product_id:\\d+}/",
          web::get().to(catalog_handlers::product_detail_handler),
        ),
    )
    // Cart
    .service(
      web::scope("/cart")
        .route("/", web::get().to(cart_handlers::cart_detail_handler))
        .route("/add/{product_id:\\d+}/", web::post().to(cart_handlers::add_to_cart_handler))
        .route(
          "/update/{item_id:\\d+}/",
          web::post().to(cart_handlers::update_cart_item_handler),
        )
        .route(
          "/remove/{item_id:\\d+}/",
          web::post().to(cart_handlers::remove_from_cart_handler),
        ),
    )
    .service(
      web::resource("/checkout/")
        .route(web::get().to(checkout_handlers::checkout_page_handler))
        .route(web::post().to(checkout_handlers::checkout_submit_handler)),
    )
    // Orders
    .service(
      web::scope("/orders")
        .route("/", web::get().to(order_handlers::order_list_handler))
        .route("/{order_id:\\d+}/", web::get().to(order_handlers::order_detail_handler))
        .service(
          web::resource("/{order_id:\\d+}/cancel/")
            .route(web::get().to(order_handlers::cancel_order_page_handler))
            .route(web::post().to(order_handlers::cancel_order_handler)),
        ),
    )
    // Reviews
    .service(
      web::scope("/reviews")
        .route("/add/{product_id:\\d+}/", web::post().to(review_handlers::add_review_handler))
        .route(
          "/delete/{review_id:\\d+}/",
          web::post().to(review_handlers::delete_review_handler),
        ),
    )
    .route(
      "/manage/orders/{order_id:\\d+}/status/",
      web::post().to(admin_handlers::change_order_status_handler),
    )
    // Accounts
    .service(
      web::resource("/signup/")
        .route(web::get().to(auth_handlers::signup_page_handler))
        .route(web::post().to(auth_handlers::signup_handler)),
    )
    .service(
      web::resource("/login/")
        .route(web::get().to(auth_handlers::login_page_handler))
        .route(web::post().to(auth_handlers::login_handler)),
    )
    .route("/logout/", web::get().to(auth_handlers::logout_handler))
    .route("/profile/", web::get().to(auth_handlers::profile_handler));
}
