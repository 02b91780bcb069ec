// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use once_cell::sync::Lazy;
use storefront::accounts::{self, SignupForm};
use storefront::catalog::{self, ProductInput};
use storefront::{db, Category, Money, Product, SqlitePool, User};
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// A fresh, migrated in-memory database.
pub async fn test_pool() -> SqlitePool {
  setup_tracing();
  let pool = db::connect_in_memory().await.expect("in-memory pool");
  db::migrate(&pool).await.expect("migrations");
  pool
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

pub async fn create_category(pool: &SqlitePool, name: &str) -> Category {
  catalog::create_category(pool, name, "").await.expect("create category")
}

pub async fn create_product(pool: &SqlitePool, category: &Category, name: &str, price: Money) -> Product {
  let input = ProductInput {
    name: name.to_string(),
    description: format!("{} description", name),
    price,
    stock: 10,
    category_id: category.id,
    image: None,
  };
  catalog::insert_product(pool, &input).await.expect("insert product")
}

/// Rewrites a product's price behind the services' back.
pub async fn set_price(pool: &SqlitePool, product_id: i64, price: Money) {
  sqlx::query("UPDATE products SET price_cents = ? WHERE id = ?")
    .bind(price)
    .bind(product_id)
    .execute(pool)
    .await
    .expect("update price");
}
