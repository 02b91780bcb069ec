// src/lib.rs

//! Storefront: the domain layer of a small online shop.
//!
//! The crate owns the relational schema and every rule that touches it:
//!  - Catalog browsing (categories, paginated product listings, related products).
//!  - A per-user cart that is converted atomically into an order at checkout.
//!  - Order history, owner cancellation and administrative status transitions.
//!  - Product reviews limited to one per user and product.
//!  - Accounts with argon2 password hashes, named permissions and server-side sessions.
//!
//! Every service takes a `&SqlitePool` (or an open transaction) and returns
//! [`Result`], so the HTTP layer only decides how a [`StoreError`] is shown.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod money;
pub mod orders;
pub mod reviews;
pub mod seed;

// --- Re-exports for the Public API ---

pub use crate::error::{Result, StoreError};
pub use crate::forms::FormErrors;
pub use crate::money::Money;

pub use crate::models::{
  Cart, CartItem, CartLine, CartSummary, Category, Order, OrderItem, OrderLine, OrderStatus, Permission, Product,
  Review, ReviewWithAuthor, User,
};

pub use sqlx::SqlitePool;
