// storefront/src/models/mod.rs

//! Row types for every table, plus the joined views the services hand out.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartSummary};
pub use category::Category;
pub use order::{Order, OrderItem, OrderLine, OrderStatus, OrderWithItemCount};
pub use product::Product;
pub use review::{Review, ReviewWithAuthor};
pub use user::{Permission, User};
