// tests/order_tests.rs
mod common;
use common::*;
use storefront::checkout::{self, CheckoutForm};
use storefront::{accounts, cart, orders};
use storefront::{Money, Order, OrderStatus, Permission, SqlitePool, StoreError, User};

async fn place_order_for(pool: &SqlitePool, user: &User, price: Money) -> Order {
  let cat = create_category(pool, &format!("cat-{}", user.username)).await;
  let product = create_product(pool, &cat, "Thing", price).await;
  cart::add_product(pool, user.id, product.id).await.unwrap();
  let form = CheckoutForm {
    full_name: user.username.clone(),
    address: "Street 1".into(),
    phone: "123".into(),
  };
  checkout::place_order(pool, user.id, &form).await.unwrap()
}

#[tokio::test]
async fn history_is_per_user_and_newest_first() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;
  let bob = create_user(&pool, "bob").await;
  let first = place_order_for(&pool, &alice, Money::from_units(3)).await;
  let second = place_order_for(&pool, &alice, Money::from_units(4)).await;
  place_order_for(&pool, &bob, Money::from_units(5)).await;

  let history = orders::list_for_user(&pool, alice.id).await.unwrap();
  let ids: Vec<i64> = history.iter().map(|o| o.order.id).collect();
  assert_eq!(ids, vec![second.id, first.id]);
  assert!(history.iter().all(|o| o.item_count == 1));
  assert_eq!(orders::count_for_user(&pool, bob.id).await.unwrap(), 1);
}

#[tokio::test]
async fn other_users_orders_are_not_found() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;
  let bob = create_user(&pool, "bob").await;
  let order = place_order_for(&pool, &alice, Money::from_units(3)).await;

  assert!(matches!(
    orders::detail_for_user(&pool, bob.id, order.id).await,
    Err(StoreError::NotFound { .. })
  ));
  assert!(matches!(
    orders::cancel(&pool, bob.id, order.id).await,
    Err(StoreError::NotFound { .. })
  ));
  assert!(orders::get_for_user(&pool, alice.id, order.id).await.is_ok());
}

#[tokio::test]
async fn owner_cancel_deletes_the_order_and_its_items() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;
  let order = place_order_for(&pool, &alice, Money::from_units(3)).await;

  orders::cancel(&pool, alice.id, order.id).await.unwrap();
  assert!(matches!(
    orders::get_for_user(&pool, alice.id, order.id).await,
    Err(StoreError::NotFound { .. })
  ));
  assert!(orders::items(&pool, order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn status_transitions_follow_the_graph_and_need_permission() {
  let pool = test_pool().await;
  let alice = create_user(&pool, "alice").await;
  let clerk = create_user(&pool, "clerk").await;
  let order = place_order_for(&pool, &alice, Money::from_units(3)).await;

  assert!(matches!(
    orders::transition_status(&pool, &alice, order.id, OrderStatus::Processing).await,
    Err(StoreError::PermissionDenied(_))
  ));

  accounts::grant_permission(&pool, clerk.id, Permission::ChangeOrder).await.unwrap();
  assert!(matches!(
    orders::transition_status(&pool, &clerk, order.id, OrderStatus::Delivered).await,
    Err(StoreError::InvalidTransition { .. })
  ));

  for next in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
    let updated = orders::transition_status(&pool, &clerk, order.id, next).await.unwrap();
    assert_eq!(updated.status, next);
  }
  assert!(matches!(
    orders::transition_status(&pool, &clerk, order.id, OrderStatus::Cancelled).await,
    Err(StoreError::InvalidTransition { .. })
  ));
  assert!(matches!(
    orders::transition_status(&pool, &clerk, 777, OrderStatus::Processing).await,
    Err(StoreError::NotFound { .. })
  ));
}
