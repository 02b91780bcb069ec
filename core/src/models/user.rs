// storefront/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub is_superuser: bool,
  pub date_joined: DateTime<Utc>,
}

/// Named capabilities stored in `user_permissions.codename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
  AddProduct,
  ChangeProduct,
  DeleteProduct,
  DeleteReview,
  ChangeOrder,
}

impl Permission {
  pub const ALL: [Permission; 5] = [
    Permission::AddProduct,
    Permission::ChangeProduct,
    Permission::DeleteProduct,
    Permission::DeleteReview,
    Permission::ChangeOrder,
  ];

  pub fn codename(self) -> &'static str {
    match self {
      Permission::AddProduct => "products.add_product",
      Permission::ChangeProduct => "products.change_product",
      Permission::DeleteProduct => "products.delete_product",
      Permission::DeleteReview => "products.delete_review",
      Permission::ChangeOrder => "orders.change_order",
    }
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.codename())
  }
}

impl FromStr for Permission {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Permission::ALL
      .into_iter()
      .find(|p| p.codename() == s)
      .ok_or_else(|| format!("unknown permission '{}'", s))
  }
}
