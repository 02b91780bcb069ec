// tests/vulnerable_tests.rs
#[macro_use]
mod common;
use common::*;

use actix_web::http::StatusCode;
use actix_web::test;
use storefront_app::config::AppConfig;

#[actix_rt::test]
async fn demos_are_not_mounted_by_default() {
  let state = test_state().await;
  let app = init_app!(state);

  for uri in ["/vulnerable/", "/vulnerable/order/1/", "/vulnerable/sqli/?q=x"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{} should not exist", uri);
  }
}

#[actix_rt::test]
async fn flag_mounts_demos_only_with_the_feature() {
  let mut config = AppConfig::local("sqlite::memory:");
  config.enable_vulnerable_demos = true;
  let state = test_state_with(config).await;
  let app = init_app!(state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/vulnerable/").to_request()).await;
  if cfg!(feature = "vulnerable-demos") {
    assert_eq!(resp.status(), StatusCode::OK);
  } else {
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}

#[cfg(feature = "vulnerable-demos")]
mod enabled {
  use super::*;
  use storefront::checkout::{self, CheckoutForm};
  use storefront::Money;

  #[actix_rt::test]
  async fn index_lists_the_demos() {
    let mut config = AppConfig::local("sqlite::memory:");
    config.enable_vulnerable_demos = true;
    let state = test_state_with(config).await;
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/vulnerable/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("OWASP Top 10"));
    assert!(body.contains("/vulnerable/order/"));
  }

  #[actix_rt::test]
  async fn insecure_order_ignores_ownership() {
    let mut config = AppConfig::local("sqlite::memory:");
    config.enable_vulnerable_demos = true;
    let state = test_state_with(config).await;
    let victim = create_user(&state.db_pool, "victim").await;
    let product = create_product(&state.db_pool, "Lamp", Money::from_units(12)).await;
    storefront::cart::add_product(&state.db_pool, victim.id, product.id).await.unwrap();
    let form = CheckoutForm {
      full_name: "Victim".into(),
      address: "1 Road".into(),
      phone: "0500000000".into(),
    };
    let order = checkout::place_order(&state.db_pool, victim.id, &form).await.unwrap();
    let app = init_app!(state);

    // No session at all, yet the victim's order is shown.
    let req = test::TestRequest::get()
      .uri(&format!("/vulnerable/order/{}/", order.id))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("User: victim"));
    assert!(body.contains("Total: 12.00"));

    // The safe route still hides it.
    let (_, intruder) = logged_in(&state.db_pool, "intruder").await;
    let req = test::TestRequest::get()
      .uri(&format!("/orders/{}/", order.id))
      .cookie(intruder)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
