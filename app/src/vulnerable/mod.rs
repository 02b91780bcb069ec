// storefront_app/src/vulnerable/mod.rs

//! Deliberately insecure handlers, one per OWASP Top 10 (2021) category.
//!
//! Every handler here omits a safeguard on purpose so the flaw can be shown
//! in a classroom. None of this is reachable unless the binary is built with
//! the `vulnerable-demos` feature AND `ENABLE_VULNERABLE_DEMOS=true`.
//!
//! The module talks to the database through its own [`DemoDb`] handle and its
//! own SQL. It never reads the storefront session cookie and never goes
//! through the `storefront` services, so nothing here can weaken the shop.

mod handlers;

use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

/// The demo module's private database handle.
#[derive(Clone)]
pub struct DemoDb(pub SqlitePool);

fn html(body: impl Into<String>) -> HttpResponse {
  HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body.into())
}

pub fn configure(cfg: &mut web::ServiceConfig, pool: SqlitePool) {
  tracing::warn!("Mounting the vulnerable demo handlers under /vulnerable/.");
  cfg.service(
    web::scope("/vulnerable")
      .app_data(web::Data::new(DemoDb(pool)))
      .route("/", web::get().to(handlers::index))
      .route("/order/{order_id}/", web::get().to(handlers::insecure_order))
      .route("/crypto/", web::get().to(handlers::sensitive_data))
      .route("/sqli/", web::get().to(handlers::sql_injection))
      .service(
        web::resource("/design/")
          .route(web::get().to(handlers::insecure_design_form))
          .route(web::post().to(handlers::insecure_design_submit)),
      )
      .route("/misconfig/", web::get().to(handlers::misconfiguration))
      .route("/outdated/", web::get().to(handlers::outdated_components))
      .service(
        web::resource("/login/")
          .route(web::get().to(handlers::weak_login_form))
          .route(web::post().to(handlers::weak_login)),
      )
      .service(
        web::resource("/deserialize/")
          .route(web::get().to(handlers::deserialize_form))
          .route(web::post().to(handlers::unsafe_deserialization)),
      )
      .service(
        web::resource("/logging/")
          .route(web::get().to(handlers::silent_action_form))
          .route(web::post().to(handlers::silent_action)),
      )
      .route("/ssrf/", web::get().to(handlers::fetch_external_content)),
  );
}
