// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use once_cell::sync::Lazy;
use serde_json::Value;
use storefront::accounts::{self, SignupForm};
use storefront::catalog::{self, ProductInput};
use storefront::{db, Money, Product, SqlitePool, User};
use storefront_app::config::AppConfig;
use storefront_app::state::AppState;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub async fn test_state() -> AppState {
  test_state_with(AppConfig::local("sqlite::memory:")).await
}

/// Like `test_state`, with a caller-adjusted configuration.
pub async fn test_state_with(config: AppConfig) -> AppState {
  setup_tracing();
  let pool = db::connect_in_memory().await.expect("in-memory pool");
  db::migrate(&pool).await.expect("migrations");
  AppState::new(pool, config)
}

/// Builds the full application around `$state` and returns the test service.
macro_rules! init_app {
  ($state:expr) => {{
    let state = $state.clone();
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new(state.clone()))
        .configure(move |cfg| storefront_app::configure_services(cfg, &state)),
    )
    .await
  }};
}

pub async fn create_user(pool: &SqlitePool, username: &str) -> User {
  let form = SignupForm {
    username: username.to_string(),
    email: format!("{}@example.com", username),
    password1: "s3cret-pass".to_string(),
    password2: "s3cret-pass".to_string(),
  };
  accounts::register(pool, &form).await.expect("register user")
}

/// A user plus a session cookie that logs requests in as them.
pub async fn logged_in(pool: &SqlitePool, username: &str) -> (User, Cookie<'static>) {
  let user = create_user(pool, username).await;
  let token = accounts::create_session(pool, user.id).await.expect("session");
  (user, Cookie::new("sessionid", token))
}

pub async fn create_product(pool: &SqlitePool, name: &str, price: Money) -> Product {
  let category = match catalog::list_categories(pool).await.expect("categories").into_iter().next() {
    Some(category) => category,
    None => catalog::create_category(pool, "General", "").await.expect("category"),
  };
  let input = ProductInput {
    name: name.to_string(),
    description: format!("{} description", name),
    price,
    stock: 5,
    category_id: category.id,
    image: None,
  };
  catalog::insert_product(pool, &input).await.expect("insert product")
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
  resp
    .headers()
    .get(actix_web::http::header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string()
}

pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
  resp.response().cookies().find(|c| c.name() == name).map(|c| c.into_owned())
}

/// The `(level, text)` pairs stored in a response's flash cookie.
pub fn flashed<B>(resp: &ServiceResponse<B>) -> Vec<(String, String)> {
  let Some(cookie) = response_cookie(resp, "messages") else {
    return Vec::new();
  };
  let bytes = URL_SAFE_NO_PAD.decode(cookie.value()).expect("flash cookie is base64");
  let messages: Vec<Value> = serde_json::from_slice(&bytes).expect("flash cookie is JSON");
  messages
    .iter()
    .map(|m| {
      (
        m["level"].as_str().unwrap_or_default().to_string(),
        m["text"].as_str().unwrap_or_default().to_string(),
      )
    })
    .collect()
}
