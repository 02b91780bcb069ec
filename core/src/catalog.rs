// storefront/src/catalog.rs

//! Categories and products: browsing, pagination and permission-gated edits.

use crate::accounts;
use crate::error::{Result, StoreError};
use crate::forms::{self, FormErrors};
use crate::models::{Category, Permission, Product, ReviewWithAuthor, User};
use crate::money::Money;
use crate::reviews;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

pub const FEATURED_LIMIT: i64 = 6;
pub const PAGE_SIZE: i64 = 9;
pub const RELATED_LIMIT: i64 = 4;
pub const NAME_MAX_CHARS: usize = 200;

// --- Categories ---

pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
  let categories = sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY name ASC, id ASC")
    .fetch_all(pool)
    .await?;
  Ok(categories)
}

pub async fn get_category(pool: &SqlitePool, category_id: i64) -> Result<Category> {
  sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE id = ?")
    .bind(category_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Category", category_id))
}

#[instrument(name = "catalog::create_category", skip(pool, description))]
pub async fn create_category(pool: &SqlitePool, name: &str, description: &str) -> Result<Category> {
  let name = name.trim();
  if name.is_empty() {
    return Err(StoreError::validation("Category name is required."));
  }
  if name.chars().count() > NAME_MAX_CHARS {
    return Err(StoreError::validation("Category name is too long."));
  }
  let category = sqlx::query_as::<_, Category>(
    "INSERT INTO categories (name, description) VALUES (?, ?) RETURNING id, name, description",
  )
  .bind(name)
  .bind(description.trim())
  .fetch_one(pool)
  .await?;
  info!(category_id = category.id, "Category created.");
  Ok(category)
}

// --- Browsing ---

#[derive(Debug, Serialize)]
pub struct HomePage {
  pub featured_products: Vec<Product>,
  pub categories: Vec<Category>,
}

/// The newest products and every category.
pub async fn home(pool: &SqlitePool) -> Result<HomePage> {
  let featured_products = sqlx::query_as::<_, Product>(&format!(
    "SELECT {} FROM products ORDER BY created_at DESC, id DESC LIMIT ?",
    Product::COLUMNS
  ))
  .bind(FEATURED_LIMIT)
  .fetch_all(pool)
  .await?;
  let categories = list_categories(pool).await?;
  Ok(HomePage {
    featured_products,
    categories,
  })
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub page: i64,
  pub num_pages: i64,
  pub total_count: i64,
  pub has_previous: bool,
  pub has_next: bool,
  pub selected_category: Option<i64>,
  pub categories: Vec<Category>,
}

/// One page (1-based) of products, newest first, optionally within a category.
///
/// An empty listing still has one page; any page past the last is not found.
#[instrument(name = "catalog::list_products", skip(pool))]
pub async fn list_products(pool: &SqlitePool, page: i64, category_id: Option<i64>) -> Result<ProductPage> {
  let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE (?1 IS NULL OR category_id = ?1)")
    .bind(category_id)
    .fetch_one(pool)
    .await?;

  let num_pages = ((total_count + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
  if page < 1 || page > num_pages {
    warn!(page, num_pages, "Requested product page is out of range.");
    return Err(StoreError::not_found("Page", page));
  }

  let products = sqlx::query_as::<_, Product>(&format!(
    "SELECT {} FROM products WHERE (?1 IS NULL OR category_id = ?1) ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
    Product::COLUMNS
  ))
  .bind(category_id)
  .bind(PAGE_SIZE)
  .bind((page - 1) * PAGE_SIZE)
  .fetch_all(pool)
  .await?;

  Ok(ProductPage {
    products,
    page,
    num_pages,
    total_count,
    has_previous: page > 1,
    has_next: page < num_pages,
    selected_category: category_id,
    categories: list_categories(pool).await?,
  })
}

pub async fn get_product(pool: &SqlitePool, product_id: i64) -> Result<Product> {
  sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = ?", Product::COLUMNS))
    .bind(product_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Product", product_id))
}

/// Up to `RELATED_LIMIT` other products from the same category.
pub async fn related_products(pool: &SqlitePool, product: &Product) -> Result<Vec<Product>> {
  let related = sqlx::query_as::<_, Product>(&format!(
    "SELECT {} FROM products WHERE category_id = ? AND id != ? ORDER BY created_at DESC, id DESC LIMIT ?",
    Product::COLUMNS
  ))
  .bind(product.category_id)
  .bind(product.id)
  .bind(RELATED_LIMIT)
  .fetch_all(pool)
  .await?;
  Ok(related)
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
  pub product: Product,
  pub category: Category,
  pub reviews: Vec<ReviewWithAuthor>,
  pub related_products: Vec<Product>,
}

#[instrument(name = "catalog::product_detail", skip(pool))]
pub async fn product_detail(pool: &SqlitePool, product_id: i64) -> Result<ProductDetail> {
  let product = get_product(pool, product_id).await?;
  let category = get_category(pool, product.category_id).await?;
  let reviews = reviews::for_product(pool, product.id).await?;
  let related_products = related_products(pool, &product).await?;
  Ok(ProductDetail {
    product,
    category,
    reviews,
    related_products,
  })
}

// --- Editing ---

/// Raw product form input, as posted. Also used to pre-fill the edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductForm {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub price: String,
  #[serde(default)]
  pub stock: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub image: Option<String>,
}

impl From<&Product> for ProductForm {
  fn from(product: &Product) -> Self {
    Self {
      name: product.name.clone(),
      description: product.description.clone(),
      price: product.price.to_string(),
      stock: product.stock.to_string(),
      category: product.category_id.to_string(),
      image: product.image.clone(),
    }
  }
}

/// Validated product fields.
#[derive(Debug, Clone)]
pub struct ProductInput {
  pub name: String,
  pub description: String,
  pub price: Money,
  pub stock: i64,
  pub category_id: i64,
  pub image: Option<String>,
}

impl ProductForm {
  pub fn clean(&self) -> Result<ProductInput, FormErrors> {
    let mut errors = FormErrors::new();

    let name = forms::required(&mut errors, "name", &self.name);
    forms::max_chars(&mut errors, "name", &name, NAME_MAX_CHARS);
    let description = forms::required(&mut errors, "description", &self.description);

    let price = match Money::parse(&self.price) {
      Ok(price) => price,
      Err(StoreError::Validation(message)) => {
        errors.add("price", message);
        Money::ZERO
      }
      Err(other) => {
        errors.add("price", other.to_string());
        Money::ZERO
      }
    };

    let stock = match self.stock.trim() {
      "" => 0,
      raw => raw.parse::<i64>().unwrap_or_else(|_| {
        errors.add("stock", "Enter a whole number.");
        0
      }),
    };

    let category_id = match self.category.trim() {
      "" => {
        errors.add("category", "This field is required.");
        0
      }
      raw => raw.parse::<i64>().unwrap_or_else(|_| {
        errors.add("category", "Select a valid choice.");
        0
      }),
    };

    let image = self
      .image
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string);

    errors.finish(ProductInput {
      name,
      description,
      price,
      stock,
      category_id,
      image,
    })
  }
}

async fn check_category(pool: &SqlitePool, input: &ProductInput) -> Result<()> {
  let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
    .bind(input.category_id)
    .fetch_optional(pool)
    .await?;
  if exists.is_none() {
    let mut errors = FormErrors::new();
    errors.add("category", "Select a valid choice. That choice is not one of the available choices.");
    return Err(errors.into());
  }
  Ok(())
}

/// Inserts a product without any permission check.
pub async fn insert_product(pool: &SqlitePool, input: &ProductInput) -> Result<Product> {
  check_category(pool, input).await?;
  let now = Utc::now();
  let product = sqlx::query_as::<_, Product>(&format!(
    "INSERT INTO products (name, description, price_cents, stock, category_id, image, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
    Product::COLUMNS
  ))
  .bind(&input.name)
  .bind(&input.description)
  .bind(input.price)
  .bind(input.stock)
  .bind(input.category_id)
  .bind(&input.image)
  .bind(now)
  .bind(now)
  .fetch_one(pool)
  .await?;
  Ok(product)
}

#[instrument(name = "catalog::create_product", skip(pool, actor, form), fields(user_id = actor.id))]
pub async fn create_product(pool: &SqlitePool, actor: &User, form: &ProductForm) -> Result<Product> {
  accounts::require_perm(pool, actor, Permission::AddProduct).await?;
  let input = form.clean()?;
  let product = insert_product(pool, &input).await?;
  info!(product_id = product.id, "Product created.");
  Ok(product)
}

#[instrument(name = "catalog::update_product", skip(pool, actor, form), fields(user_id = actor.id))]
pub async fn update_product(pool: &SqlitePool, actor: &User, product_id: i64, form: &ProductForm) -> Result<Product> {
  accounts::require_perm(pool, actor, Permission::ChangeProduct).await?;
  get_product(pool, product_id).await?;
  let input = form.clean()?;
  check_category(pool, &input).await?;

  let product = sqlx::query_as::<_, Product>(&format!(
    "UPDATE products SET name = ?, description = ?, price_cents = ?, stock = ?, category_id = ?, image = ?, updated_at = ? \
     WHERE id = ? RETURNING {}",
    Product::COLUMNS
  ))
  .bind(&input.name)
  .bind(&input.description)
  .bind(input.price)
  .bind(input.stock)
  .bind(input.category_id)
  .bind(&input.image)
  .bind(Utc::now())
  .bind(product_id)
  .fetch_one(pool)
  .await?;
  info!(product_id, "Product updated.");
  Ok(product)
}

/// Deletes a product; its cart items, order items and reviews cascade.
#[instrument(name = "catalog::delete_product", skip(pool, actor), fields(user_id = actor.id))]
pub async fn delete_product(pool: &SqlitePool, actor: &User, product_id: i64) -> Result<Product> {
  accounts::require_perm(pool, actor, Permission::DeleteProduct).await?;
  let product = get_product(pool, product_id).await?;
  sqlx::query("DELETE FROM products WHERE id = ?")
    .bind(product_id)
    .execute(pool)
    .await?;
  info!(product_id, "Product deleted.");
  Ok(product)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn product_form_collects_every_field_error() {
    let form = ProductForm {
      name: "  ".into(),
      description: "".into(),
      price: "-3".into(),
      stock: "many".into(),
      category: "x".into(),
      image: None,
    };
    let errors = form.clean().err().unwrap();
    for field in ["name", "description", "price", "stock", "category"] {
      assert!(errors.has(field), "missing error for {}", field);
    }
  }

  #[test]
  fn product_form_defaults_stock_and_drops_blank_image() {
    let form = ProductForm {
      name: "Phone".into(),
      description: "A phone".into(),
      price: "199.90".into(),
      stock: "".into(),
      category: "3".into(),
      image: Some("   ".into()),
    };
    let input = form.clean().unwrap();
    assert_eq!(input.price, Money::from_cents(19990));
    assert_eq!(input.stock, 0);
    assert_eq!(input.category_id, 3);
    assert!(input.image.is_none());
  }
}
