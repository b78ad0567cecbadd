//! Sign-in, token refresh and session expiry against the fake backend.

#![allow(clippy::unwrap_used)]

use shopfront_client::storage::{AuthState, AuthTransition};
use shopfront_client::{ClientError, MergeOutcome, NoticeLevel};
use shopfront_integration_tests::backend::{Counters, VALID_OTP};
use shopfront_integration_tests::{MOBILE, TestShop};

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_send_otp_rejects_malformed_mobile() {
    let ts = TestShop::start().await;

    let err = ts.shop.auth().send_otp("12345").await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_send_otp_accepts_valid_mobile() {
    let ts = TestShop::start().await;

    ts.shop.auth().send_otp(MOBILE).await.unwrap();

    assert!(!ts.shop.auth().is_authenticated());
}

#[tokio::test]
async fn test_wrong_otp_keeps_guest() {
    let ts = TestShop::start().await;

    let err = ts.shop.login(MOBILE, "654321").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Invalid or expired OTP");
    assert_eq!(ts.shop.auth().state(), AuthState::Guest);
}

#[tokio::test]
async fn test_login_publishes_auth_state() {
    let ts = TestShop::start().await;
    let mut rx = ts.shop.auth().subscribe();
    assert_eq!(*rx.borrow_and_update(), AuthState::Guest);

    ts.login().await;

    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), AuthState::Authenticated);

    ts.shop.logout().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), AuthState::Guest);
}

#[tokio::test]
async fn test_private_reads_require_login() {
    let ts = TestShop::start().await;

    let err = ts.shop.me().await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated), "got {err:?}");
    assert!(err.requires_login());
}

// =============================================================================
// Token refresh
// =============================================================================

#[tokio::test]
async fn test_expired_access_token_refreshes_once() {
    let ts = TestShop::start().await;
    ts.login().await;
    ts.backend.expire_access_tokens();

    // Login already cached the profile, so go to the API directly.
    let user = ts.shop.api().get_me().await.unwrap();

    assert_eq!(user.mobile_number, MOBILE);
    assert_eq!(Counters::get(&ts.backend.counters().refresh), 1);
    assert!(ts.shop.auth().is_authenticated());
}

#[tokio::test]
async fn test_concurrent_unauthorized_share_one_refresh() {
    let ts = TestShop::start().await;
    ts.login().await;
    ts.backend.expire_access_tokens();

    let api = ts.shop.api();
    let (cart, me, addresses) = tokio::join!(api.get_cart(), api.get_me(), api.list_addresses());

    assert!(cart.is_ok());
    assert!(me.is_ok());
    assert!(addresses.is_ok());
    assert_eq!(Counters::get(&ts.backend.counters().refresh), 1);
}

#[tokio::test]
async fn test_rejected_after_refresh_expires_session() {
    let ts = TestShop::start().await;
    ts.login().await;
    ts.backend.reject_all_access(true);

    let err = ts.shop.api().get_me().await.map_err(ClientError::from).unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired), "got {err:?}");
    // The retry after refresh is not refreshed again.
    assert_eq!(Counters::get(&ts.backend.counters().refresh), 1);
    assert!(!ts.shop.auth().is_authenticated());
    assert!(ts.shop.api().tokens().access_token().unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_refresh_expires_session() {
    let ts = TestShop::start().await;
    ts.login().await;
    ts.backend.expire_access_tokens();
    ts.backend.reject_refresh(true);

    let err = ts.shop.api().get_cart().await.map_err(ClientError::from).unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired), "got {err:?}");
    assert_eq!(
        err.user_message(),
        "Your session has expired. Please sign in again."
    );
    assert_eq!(ts.shop.auth().state(), AuthState::Guest);
    assert!(ts.shop.api().tokens().refresh_token().unwrap().is_none());
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_session_even_when_server_rejects() {
    let ts = TestShop::start().await;
    ts.login().await;
    ts.backend.reject_all_access(true);

    ts.shop.logout().await.unwrap();

    assert_eq!(Counters::get(&ts.backend.counters().logout), 1);
    assert_eq!(Counters::get(&ts.backend.counters().refresh), 0);
    assert!(!ts.shop.auth().is_authenticated());
    assert!(
        ts.notices
            .drain()
            .iter()
            .any(|n| n.level == NoticeLevel::Info && n.message == "You have been signed out")
    );
}

#[tokio::test]
async fn test_logout_when_signed_out_skips_server() {
    let ts = TestShop::start().await;

    ts.shop.logout().await.unwrap();

    assert_eq!(Counters::get(&ts.backend.counters().logout), 0);
}

// =============================================================================
// Shared storage
// =============================================================================

#[tokio::test]
async fn test_sync_picks_up_login_without_merging_twice() {
    let ts = TestShop::start().await;
    let oil = ts.backend.add_product("coconut-oil", 250, 20);
    ts.shop.cart().add_item(&oil, 2).await.unwrap();
    let (other, _other_notices) = ts.second_client();

    ts.login().await;
    let synced = other.sync_auth().await.unwrap();

    assert_eq!(
        synced,
        Some((AuthTransition::LoggedIn, Some(MergeOutcome::Nothing)))
    );
    assert_eq!(Counters::get(&ts.backend.counters().merge), 1);
    assert!(other.auth().is_authenticated());
    assert_eq!(other.cart().item_count().await.unwrap(), 2);

    // Nothing further to apply.
    assert_eq!(other.sync_auth().await.unwrap(), None);
}

#[tokio::test]
async fn test_sync_picks_up_logout() {
    let ts = TestShop::start().await;
    ts.shop.login(MOBILE, VALID_OTP).await.unwrap();
    let (other, _other_notices) = ts.second_client();
    assert!(other.auth().is_authenticated());

    ts.shop.logout().await.unwrap();
    let synced = other.sync_auth().await.unwrap();

    assert_eq!(synced, Some((AuthTransition::LoggedOut, None)));
    assert!(!other.auth().is_authenticated());
    assert!(other.cart().get_cart().await.unwrap().is_empty());
}
