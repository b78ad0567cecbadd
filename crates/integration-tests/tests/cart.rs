//! Cart reconciliation against the fake backend.
//!
//! Guest carts live in local storage and follow the stock and per-line caps.
//! At login the guest cart is merged into the server cart once, and local
//! storage is emptied whether or not the merge worked.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use shopfront_client::storage::{KeyValueStore, keys};
use shopfront_client::{MergeOutcome, NoticeLevel};
use shopfront_core::{CartItem, Quantity};
use shopfront_integration_tests::backend::{Counters, VALID_OTP};
use shopfront_integration_tests::{MOBILE, TestShop};

fn quantity_of(cart: &shopfront_core::Cart, product: &shopfront_core::Product) -> u32 {
    cart.find(product.id).map_or(0, |line| line.quantity)
}

// =============================================================================
// Guest cart
// =============================================================================

#[tokio::test]
async fn test_guest_quantity_capped_by_stock() {
    let ts = TestShop::start().await;
    let scarce = ts.backend.add_product("saffron", 450, 4);

    ts.shop.cart().add_item(&scarce, 3).await.unwrap();
    let cart = ts.shop.cart().add_item(&scarce, 3).await.unwrap();

    assert_eq!(quantity_of(&cart, &scarce), 4);
    assert!(
        ts.notices
            .drain()
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.message.contains("Only 4"))
    );
}

#[tokio::test]
async fn test_guest_quantity_capped_at_ten() {
    let ts = TestShop::start().await;
    let plenty = ts.backend.add_product("rice", 90, 500);

    ts.shop.cart().add_item(&plenty, 8).await.unwrap();
    ts.shop.cart().add_item(&plenty, 5).await.unwrap();
    let cart = ts.shop.cart().add_item(&plenty, 1).await.unwrap();

    assert_eq!(quantity_of(&cart, &plenty), 10);
    assert_eq!(cart.items.len(), 1, "one line per product");

    // The cap survives a reload from storage.
    let reloaded = ts.shop.cart().reload_guest().unwrap();
    assert_eq!(quantity_of(&reloaded, &plenty), 10);
}

#[tokio::test]
async fn test_guest_rejects_out_of_stock_product() {
    let ts = TestShop::start().await;
    let gone = ts.backend.add_product("mango-pickle", 120, 0);

    let cart = ts.shop.cart().add_item(&gone, 1).await.unwrap();

    assert!(cart.is_empty());
    assert!(ts.stored_guest_cart().is_none());
    let notices = ts.notices.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_guest_update_out_of_range_leaves_cart_unchanged() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 6);
    ts.shop.cart().add_item(&oil, 2).await.unwrap();
    ts.notices.drain();

    let cart = ts.shop.cart().update_quantity(oil.id, 0).await.unwrap();
    assert_eq!(quantity_of(&cart, &oil), 2);

    let cart = ts.shop.cart().update_quantity(oil.id, 7).await.unwrap();
    assert_eq!(quantity_of(&cart, &oil), 2);
    assert_eq!(ts.notices.drain().len(), 2);

    let cart = ts.shop.cart().update_quantity(oil.id, 6).await.unwrap();
    assert_eq!(quantity_of(&cart, &oil), 6);
    assert!(ts.notices.is_empty());
}

#[tokio::test]
async fn test_guest_remove_last_item_empties_cart() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 6);
    ts.shop.cart().add_item(&oil, 1).await.unwrap();
    assert!(ts.stored_guest_cart().is_some());

    let cart = ts.shop.cart().remove_item(oil.id).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(cart.item_count, 0);
    assert_eq!(ts.shop.cart().item_count().await.unwrap(), 0);
    assert!(ts.stored_guest_cart().is_none());
}

#[tokio::test]
async fn test_stored_guest_cart_is_normalized_before_use_and_merge() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 20);

    // Lines written by another process, outside the add rules.
    let line = |quantity: u32| {
        let mut item = CartItem::guest(oil.clone(), Quantity::new(1).unwrap());
        item.quantity = quantity;
        item
    };
    let raw = serde_json::to_string(&vec![line(15), line(3), line(0)]).unwrap();
    ts.store.set(keys::GUEST_CART, &raw).unwrap();
    let (other, _other_notices) = ts.second_client();

    let cart = other.cart().get_cart().await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(quantity_of(&cart, &oil), 10);
    assert_eq!(cart.item_count, 10);

    let outcome = other.login(MOBILE, VALID_OTP).await.unwrap();
    let MergeOutcome::Merged(cart) = outcome else {
        panic!("expected merge, got {outcome:?}");
    };
    assert_eq!(quantity_of(&cart, &oil), 10);
    assert_eq!(ts.backend.cart_lines(), vec![(oil.id, 10)]);
    assert_eq!(Counters::get(&ts.backend.counters().merge), 1);
}

// =============================================================================
// Login merge
// =============================================================================

#[tokio::test]
async fn test_login_merges_guest_cart_once() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 20);
    let rice = ts.backend.add_product("rice", 90, 20);
    ts.backend.seed_cart(oil.id, 3);

    ts.shop.cart().add_item(&oil, 2).await.unwrap();
    ts.shop.cart().add_item(&rice, 1).await.unwrap();

    let outcome = ts.login().await;
    let MergeOutcome::Merged(cart) = outcome else {
        panic!("expected merge, got {outcome:?}");
    };

    let lines = ts.backend.cart_lines();
    assert_eq!(lines.iter().filter(|(id, _)| *id == oil.id).count(), 1);
    assert_eq!(quantity_of(&cart, &oil), 5);
    assert_eq!(quantity_of(&cart, &rice), 1);
    assert!(ts.stored_guest_cart().is_none());
    assert_eq!(Counters::get(&ts.backend.counters().merge), 1);

    // Signing in again has nothing left to merge.
    ts.shop.logout().await.unwrap();
    assert_eq!(ts.login().await, MergeOutcome::Nothing);
    assert_eq!(Counters::get(&ts.backend.counters().merge), 1);
    assert_eq!(quantity_of(&ts.shop.cart().get_cart().await.unwrap(), &oil), 5);
}

#[tokio::test]
async fn test_empty_guest_cart_sends_no_merge() {
    let ts = TestShop::start().await;

    assert_eq!(ts.login().await, MergeOutcome::Nothing);
    assert_eq!(Counters::get(&ts.backend.counters().merge), 0);
}

#[tokio::test]
async fn test_failed_merge_discards_guest_cart_and_notifies() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 20);
    ts.backend.fail_merge(true);
    ts.shop.cart().add_item(&oil, 2).await.unwrap();
    ts.notices.drain();

    let outcome = ts.login().await;

    let MergeOutcome::Failed { dropped } = outcome else {
        panic!("expected failed merge, got {outcome:?}");
    };
    assert_eq!(dropped.len(), 1);
    assert!(ts.stored_guest_cart().is_none());
    assert!(ts.backend.cart_lines().is_empty());
    assert!(
        ts.notices
            .drain()
            .iter()
            .any(|n| n.level == NoticeLevel::Warning)
    );
}

// =============================================================================
// Authenticated cart
// =============================================================================

#[tokio::test]
async fn test_authenticated_mutations_go_to_server() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 20);
    ts.login().await;

    let cart = ts.shop.cart().add_item(&oil, 2).await.unwrap();
    assert_eq!(ts.backend.cart_lines(), vec![(oil.id, 2)]);
    assert_eq!(cart.item_count, 2);
    assert!(ts.stored_guest_cart().is_none());

    let cart = ts.shop.cart().update_quantity(oil.id, 4).await.unwrap();
    assert_eq!(quantity_of(&cart, &oil), 4);

    let cart = ts.shop.cart().remove_item(oil.id).await.unwrap();
    assert!(cart.is_empty());
    assert!(ts.backend.cart_lines().is_empty());
}

#[tokio::test]
async fn test_authenticated_add_clamps_before_sending() {
    let ts = TestShop::start().await;
    let saffron = ts.backend.add_product("saffron", 450, 3);
    ts.login().await;

    let cart = ts.shop.cart().add_item(&saffron, 5).await.unwrap();

    assert_eq!(quantity_of(&cart, &saffron), 3);
    assert_eq!(ts.backend.cart_lines(), vec![(saffron.id, 3)]);
}

#[tokio::test]
async fn test_logout_returns_to_guest_cart() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 20);
    ts.login().await;
    ts.shop.cart().add_item(&oil, 2).await.unwrap();

    let cart = ts.shop.logout().await.unwrap();

    assert!(cart.is_empty());
    assert!(!ts.shop.auth().is_authenticated());
    assert!(ts.shop.cart().get_cart().await.unwrap().is_empty());
    // Server cart is untouched.
    assert_eq!(ts.backend.cart_lines(), vec![(oil.id, 2)]);
}
