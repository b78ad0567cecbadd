//! Two-phase checkout: create the order, then hand off to the payment gateway.
//!
//! ```text
//! place_order ─► POST /orders ─► POST /payments/create ─► provider.collect
//!                                                            │
//!        ┌──────────────────────┬─────────────────────┬──────┘
//!        ▼                      ▼                     ▼
//!    Success               Failed / Dismissed      (error)
//!        │                      │
//!  POST /payments/verify   order stays pending,
//!        │                 cart untouched
//!   ok ──┴── err
//!   │         └─► VerificationFailed (flagged for follow-up)
//!   └─► Paid (cart cleared)
//! ```
//!
//! Only one checkout runs at a time per [`CheckoutFlow`]. A second
//! submission while one is in flight returns [`CheckoutOutcome::AlreadyInFlight`]
//! without touching the backend. The latch lives in memory only.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shopfront_core::{AddressId, Cart, Order, OrderEstimate, Payment};
use tracing::{error, info, instrument, warn};

use crate::api::ApiClient;
use crate::cache::{QueryCache, QueryKey};
use crate::cart::CartService;
use crate::error::{ClientError, Result, add_breadcrumb, flag_for_follow_up};
use crate::notify::Notifier;
use crate::payment::{PaymentContext, PaymentOutcome, PaymentProvider};

/// Result of a checkout or payment retry.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Payment verified; the order is confirmed and the cart cleared.
    Paid { order: Order, payment: Payment },
    /// The gateway step failed or was dismissed. The order is still pending
    /// and can be paid later.
    PaymentIncomplete { order: Order, reason: String },
    /// The gateway reported success but the backend did not verify it.
    VerificationFailed { order: Order },
    /// Another checkout was already running; nothing was sent.
    AlreadyInFlight,
}

impl CheckoutOutcome {
    /// The order this outcome refers to, if one was created.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        match self {
            Self::Paid { order, .. }
            | Self::PaymentIncomplete { order, .. }
            | Self::VerificationFailed { order } => Some(order),
            Self::AlreadyInFlight => None,
        }
    }

    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid { .. })
    }
}

/// Holds the in-flight latch until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(latch: &'a AtomicBool) -> Option<Self> {
        latch
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(latch))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// CheckoutFlow
// =============================================================================

/// Order placement and payment hand-off.
#[derive(Clone)]
pub struct CheckoutFlow {
    inner: Arc<CheckoutFlowInner>,
}

struct CheckoutFlowInner {
    api: ApiClient,
    cache: QueryCache,
    cart: CartService,
    notifier: Arc<dyn Notifier>,
    merchant_name: String,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl CheckoutFlow {
    #[must_use]
    pub fn new(
        api: ApiClient,
        cache: QueryCache,
        cart: CartService,
        notifier: Arc<dyn Notifier>,
        merchant_name: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(CheckoutFlowInner {
                api,
                cache,
                cart,
                notifier,
                merchant_name: merchant_name.into(),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Whether a checkout is currently running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    fn require_login(&self) -> Result<()> {
        if self.inner.api.tokens().is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    /// Estimated totals for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read.
    pub async fn summary(&self) -> Result<OrderEstimate> {
        let cart = self.inner.cart.get_cart().await?;
        Ok(OrderEstimate::from_subtotal(cart.subtotal))
    }

    /// Create an order for the cart shipped to `address_id`, then collect
    /// payment through `provider`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` when signed out,
    /// `ClientError::Validation` when the cart is empty, or an error if the
    /// order cannot be created. Once the order exists, payment problems are
    /// reported through the outcome instead.
    #[instrument(skip(self, provider))]
    pub async fn place_order(
        &self,
        address_id: AddressId,
        provider: &dyn PaymentProvider,
    ) -> Result<CheckoutOutcome> {
        let Some(_guard) = InFlight::acquire(&self.inner.in_flight) else {
            warn!("Checkout already in flight, ignoring submission");
            return Ok(CheckoutOutcome::AlreadyInFlight);
        };
        self.require_login()?;

        let cart = self.inner.cart.get_cart().await?;
        if cart.is_empty() {
            return Err(ClientError::Validation("Your cart is empty".to_string()));
        }

        let order = self.inner.api.create_order(address_id).await?;
        self.inner.cache.invalidate_orders();
        info!(order_number = %order.order_number, total = %order.total, "Order created");
        add_breadcrumb(
            "checkout",
            "Order created",
            Some(&[("order_number", order.order_number.as_str())]),
        );

        self.collect_payment(order, provider).await
    }

    /// Pay for an existing pending order (by id or order number).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` when signed out,
    /// `ClientError::Validation` when the order is not awaiting payment, or
    /// an error if the order cannot be fetched.
    #[instrument(skip(self, provider))]
    pub async fn retry_payment(
        &self,
        order_ref: &str,
        provider: &dyn PaymentProvider,
    ) -> Result<CheckoutOutcome> {
        let Some(_guard) = InFlight::acquire(&self.inner.in_flight) else {
            warn!("Checkout already in flight, ignoring payment retry");
            return Ok(CheckoutOutcome::AlreadyInFlight);
        };
        self.require_login()?;

        let order = self.inner.api.get_order(order_ref).await?;
        if !order.status.is_awaiting_payment() {
            return Err(ClientError::Validation(format!(
                "Order {} is already {}",
                order.order_number, order.status
            )));
        }

        self.collect_payment(order, provider).await
    }

    async fn collect_payment(
        &self,
        order: Order,
        provider: &dyn PaymentProvider,
    ) -> Result<CheckoutOutcome> {
        let inner = &self.inner;

        let intent = match inner.api.create_payment(order.id).await {
            Ok(intent) => intent,
            Err(e) => {
                let e = ClientError::from(e);
                if e.requires_login() {
                    return Err(e);
                }
                warn!(error = %e, order_number = %order.order_number, "Could not start payment");
                inner.notifier.error(&format!(
                    "Could not start payment: {}. Order {} is saved and can be paid later.",
                    e.user_message(),
                    order.order_number
                ));
                return Ok(CheckoutOutcome::PaymentIncomplete {
                    reason: e.user_message(),
                    order,
                });
            }
        };

        let context = PaymentContext {
            merchant_name: inner.merchant_name.clone(),
            order_number: order.order_number.clone(),
            amount: intent.price(),
            contact: None,
        };

        let verification = match provider.collect(&intent, &context).await {
            PaymentOutcome::Success(verification) => verification,
            PaymentOutcome::Failed { reason } => {
                info!(order_number = %order.order_number, %reason, "Payment failed at gateway");
                inner.notifier.error(&format!(
                    "Payment failed: {reason}. You can retry from your orders."
                ));
                return Ok(CheckoutOutcome::PaymentIncomplete { order, reason });
            }
            PaymentOutcome::Dismissed => {
                info!(order_number = %order.order_number, "Payment dismissed");
                inner.notifier.info(&format!(
                    "Payment cancelled. Order {} is saved and can be paid later.",
                    order.order_number
                ));
                return Ok(CheckoutOutcome::PaymentIncomplete {
                    order,
                    reason: "Payment cancelled".to_string(),
                });
            }
        };

        match inner.api.verify_payment(&verification).await {
            Ok(payment) => {
                // The backend clears the server cart on successful verification.
                inner.cache.put(QueryKey::Cart, Cart::empty()).await;
                inner.cache.invalidate_orders();

                let order = match inner.api.get_order(&order.id.to_string()).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        warn!(error = %e, "Could not refresh paid order");
                        order
                    }
                };

                info!(order_number = %order.order_number, "Payment verified");
                add_breadcrumb(
                    "checkout",
                    "Payment verified",
                    Some(&[("order_number", order.order_number.as_str())]),
                );
                inner.notifier.success(&format!(
                    "Payment successful. Order {} is confirmed.",
                    order.order_number
                ));
                Ok(CheckoutOutcome::Paid { order, payment })
            }
            Err(e) => {
                error!(error = %e, order_number = %order.order_number, "Payment verification failed");
                flag_for_follow_up(
                    &order.order_number,
                    &verification.gateway_order_id,
                    &e.to_string(),
                );
                inner.cache.invalidate_orders();
                inner.notifier.error(&format!(
                    "We couldn't confirm your payment for order {}. If you were charged, please contact support.",
                    order.order_number
                ));
                Ok(CheckoutOutcome::VerificationFailed { order })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_admits_one_holder() {
        let latch = AtomicBool::new(false);
        let first = InFlight::acquire(&latch);
        assert!(first.is_some());
        assert!(InFlight::acquire(&latch).is_none());
    }

    #[test]
    fn test_latch_released_on_drop() {
        let latch = AtomicBool::new(false);
        drop(InFlight::acquire(&latch));
        assert!(!latch.load(Ordering::Acquire));
        assert!(InFlight::acquire(&latch).is_some());
    }

    #[test]
    fn test_in_flight_outcome_has_no_order() {
        assert!(CheckoutOutcome::AlreadyInFlight.order().is_none());
        assert!(!CheckoutOutcome::AlreadyInFlight.is_paid());
    }
}
