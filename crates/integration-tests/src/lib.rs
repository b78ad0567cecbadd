//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Every test starts its own [`backend::FakeBackend`] on an ephemeral port,
//! so tests run in parallel without shared state.
//!
//! # Test Categories
//!
//! - `cart` - Guest cart rules, login merge, authenticated mutations
//! - `auth` - Token refresh and session expiry
//! - `checkout` - Order placement, payment outcomes, the in-flight latch

pub mod backend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shopfront_client::storage::{KeyValueStore, MemoryStore, keys};
use shopfront_client::{
    ClientConfig, NoticeQueue, PaymentContext, PaymentOutcome, PaymentProvider, Storefront, Stores,
};
use shopfront_core::{PaymentIntent, PaymentVerification};

use backend::{FakeBackend, VALID_OTP, VALID_SIGNATURE};

/// Mobile number used for every test login.
pub const MOBILE: &str = "+919876543210";

/// A client wired to a fresh fake backend.
pub struct TestShop {
    pub backend: FakeBackend,
    pub shop: Storefront,
    pub notices: NoticeQueue,
    pub store: Arc<MemoryStore>,
}

impl TestShop {
    /// Start a backend and build a signed-out client against it.
    ///
    /// # Panics
    ///
    /// Panics if the backend cannot bind or the client cannot be built.
    pub async fn start() -> Self {
        let backend = FakeBackend::new();
        let base_url = backend.start().await.expect("bind fake backend");

        let mut config = ClientConfig::for_api_url(&base_url).expect("config");
        config.http_timeout = Some(Duration::from_secs(5));

        let store = Arc::new(MemoryStore::new());
        let notices = NoticeQueue::new();
        let shop = Storefront::new(
            config,
            Stores::shared(Arc::clone(&store) as Arc<dyn KeyValueStore>),
            Arc::new(notices.clone()),
        )
        .expect("storefront");

        Self {
            backend,
            shop,
            notices,
            store,
        }
    }

    /// Sign in with the fixed OTP.
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn login(&self) -> shopfront_client::MergeOutcome {
        self.shop.login(MOBILE, VALID_OTP).await.expect("login")
    }

    /// Another client on the same backend and storage, like a second tab.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn second_client(&self) -> (Storefront, NoticeQueue) {
        let notices = NoticeQueue::new();
        let shop = Storefront::new(
            self.shop.config().clone(),
            Stores::shared(Arc::clone(&self.store) as Arc<dyn KeyValueStore>),
            Arc::new(notices.clone()),
        )
        .expect("storefront");
        (shop, notices)
    }

    /// Raw guest cart value in local storage.
    ///
    /// # Panics
    ///
    /// Panics if the store fails.
    #[must_use]
    pub fn stored_guest_cart(&self) -> Option<String> {
        self.store.get(keys::GUEST_CART).expect("store read")
    }
}

/// A payment provider that returns a fixed outcome after an optional delay.
pub struct ScriptedPayment {
    outcome: Script,
    delay: Duration,
}

#[derive(Clone, Copy)]
enum Script {
    Pay { signature_ok: bool },
    Fail,
    Dismiss,
}

impl ScriptedPayment {
    /// Completes payment with a signature the backend accepts.
    #[must_use]
    pub const fn pays() -> Self {
        Self::new(Script::Pay { signature_ok: true })
    }

    /// Completes payment with a forged signature.
    #[must_use]
    pub const fn pays_with_bad_signature() -> Self {
        Self::new(Script::Pay {
            signature_ok: false,
        })
    }

    #[must_use]
    pub const fn fails() -> Self {
        Self::new(Script::Fail)
    }

    #[must_use]
    pub const fn dismisses() -> Self {
        Self::new(Script::Dismiss)
    }

    const fn new(outcome: Script) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
        }
    }

    /// Wait this long before answering.
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PaymentProvider for ScriptedPayment {
    async fn collect(&self, intent: &PaymentIntent, _context: &PaymentContext) -> PaymentOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.outcome {
            Script::Pay { signature_ok } => PaymentOutcome::Success(PaymentVerification {
                gateway_order_id: intent.gateway_order_id.clone(),
                gateway_payment_id: "pay_test_1".to_string(),
                signature: if signature_ok {
                    VALID_SIGNATURE.to_string()
                } else {
                    "forged".to_string()
                },
            }),
            Script::Fail => PaymentOutcome::Failed {
                reason: "Card declined".to_string(),
            },
            Script::Dismiss => PaymentOutcome::Dismissed,
        }
    }
}
