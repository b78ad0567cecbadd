//! Payment gateway hand-off endpoints.

use reqwest::Method;
use shopfront_core::{OrderId, Payment, PaymentCreate, PaymentIntent, PaymentVerification};
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// Create a gateway order for a pending order.
    ///
    /// Calling this again for an order whose earlier attempt failed or was
    /// dismissed issues a fresh gateway order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not pending or already paid.
    #[instrument(skip(self))]
    pub async fn create_payment(&self, order_id: OrderId) -> Result<PaymentIntent, ApiError> {
        let body = PaymentCreate { order_id };
        self.authed(Method::POST, "payments/create", Some(&body))
            .await
    }

    /// Submit the gateway callback for signature verification.
    ///
    /// On success the backend confirms the order and clears the cart.
    ///
    /// # Errors
    ///
    /// Returns a 400 status error when the signature does not match.
    #[instrument(skip(self, verification), fields(gateway_order_id = %verification.gateway_order_id))]
    pub async fn verify_payment(
        &self,
        verification: &PaymentVerification,
    ) -> Result<Payment, ApiError> {
        self.authed(Method::POST, "payments/verify", Some(verification))
            .await
    }
}
