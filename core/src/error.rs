// storefront/src/error.rs
use crate::forms::FormErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{entity} with id {id} not found")]
  NotFound { entity: &'static str, id: i64 },

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Invalid form: {0}")]
  InvalidForm(FormErrors),

  #[error("Permission denied: {0}")]
  PermissionDenied(String),

  #[error("User {user_id} already reviewed product {product_id}")]
  AlreadyReviewed { user_id: i64, product_id: i64 },

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Order cannot move from {from} to {to}")]
  InvalidTransition { from: String, to: String },

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Password hashing error: {0}")]
  PasswordHash(String),
}

impl StoreError {
  pub fn not_found(entity: &'static str, id: i64) -> Self {
    StoreError::NotFound { entity, id }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    StoreError::Validation(message.into())
  }
}

impl From<FormErrors> for StoreError {
  fn from(errors: FormErrors) -> Self {
    StoreError::InvalidForm(errors)
  }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
