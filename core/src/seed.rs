// storefront/src/seed.rs

//! Demo data for a fresh database and the bootstrap superuser.

use crate::accounts;
use crate::catalog::{self, ProductInput};
use crate::models::User;
use crate::money::Money;
use anyhow::Context;
use sqlx::SqlitePool;
use tracing::{info, instrument};

const DEMO_CATALOG: &[(&str, &str, &[(&str, &str, i64, i64)])] = &[
  (
    "Phones",
    "Smartphones and accessories",
    &[
      ("Phone X", "Six-inch display, two cameras.", 249_900, 12),
      ("Phone Mini", "Compact phone with a long battery life.", 129_900, 4),
      ("USB-C Charger", "30W fast charger.", 7_900, 50),
    ],
  ),
  (
    "Laptops",
    "Portable computers",
    &[
      ("Laptop Pro 14", "14-inch laptop, 16 GB RAM.", 549_900, 3),
      ("Laptop Air 13", "Light 13-inch laptop.", 399_900, 0),
    ],
  ),
  (
    "Audio",
    "Headphones and speakers",
    &[
      ("Wireless Earbuds", "Noise cancelling earbuds.", 39_900, 25),
      ("Bluetooth Speaker", "Waterproof portable speaker.", 19_900, 8),
    ],
  ),
];

/// Inserts the demo categories and products when the catalog is empty.
/// Returns how many products were created.
#[instrument(name = "seed::demo_catalog", skip(pool))]
pub async fn seed_demo_catalog(pool: &SqlitePool) -> anyhow::Result<usize> {
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
    .fetch_one(pool)
    .await
    .context("counting products")?;
  if existing > 0 {
    info!(existing, "Catalog already populated; skipping demo seed.");
    return Ok(0);
  }

  let mut created = 0;
  for (category_name, category_description, products) in DEMO_CATALOG {
    let category = catalog::create_category(pool, category_name, category_description)
      .await
      .with_context(|| format!("creating category '{}'", category_name))?;
    for (name, description, price_cents, stock) in products.iter() {
      let input = ProductInput {
        name: name.to_string(),
        description: description.to_string(),
        price: Money::from_cents(*price_cents),
        stock: *stock,
        category_id: category.id,
        image: None,
      };
      catalog::insert_product(pool, &input)
        .await
        .with_context(|| format!("creating product '{}'", name))?;
      created += 1;
    }
  }
  info!(created, "Demo catalog seeded.");
  Ok(created)
}

/// Creates the configured superuser unless the username is already taken.
#[instrument(name = "seed::bootstrap_admin", skip(pool, password))]
pub async fn bootstrap_admin(pool: &SqlitePool, username: &str, email: &str, password: &str) -> anyhow::Result<Option<User>> {
  if accounts::find_by_username(pool, username).await?.is_some() {
    return Ok(None);
  }
  let user = accounts::create_superuser(pool, username, email, password)
    .await
    .context("creating bootstrap superuser")?;
  info!(user_id = user.id, "Bootstrap superuser created.");
  Ok(Some(user))
}
