//! Order endpoints.
//!
//! Orders can be addressed by UUID or by order number (`ORD...`); the
//! backend accepts either in the path.

use reqwest::Method;
use shopfront_core::{AddressId, Order, OrderCreate, OrderList, OrderTracking};
use tracing::instrument;

use super::auth::MessageResponse;
use super::products::encode_segment;
use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create a pending order from the server cart.
    ///
    /// The cart is left untouched; it is cleared when payment is verified.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, the address is unknown, or a
    /// product is out of stock.
    #[instrument(skip(self))]
    pub async fn create_order(&self, address_id: AddressId) -> Result<Order, ApiError> {
        let body = OrderCreate { address_id };
        self.authed(Method::POST, "orders", Some(&body)).await
    }

    /// Get one page of the order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: u32, page_size: u32) -> Result<OrderList, ApiError> {
        let query = [
            ("page", page.max(1).to_string()),
            ("page_size", page_size.clamp(1, super::products::MAX_PAGE_SIZE).to_string()),
        ];
        self.authed_query("orders", &query).await
    }

    /// Get an order by id or order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_ref: &str) -> Result<Order, ApiError> {
        let path = format!("orders/{}", encode_segment(order_ref));
        self.authed::<_, ()>(Method::GET, &path, None).await
    }

    /// Get shipment tracking for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn track_order(&self, order_ref: &str) -> Result<OrderTracking, ApiError> {
        let path = format!("orders/{}/track", encode_segment(order_ref));
        self.authed::<_, ()>(Method::GET, &path, None).await
    }

    /// Cancel an order. Returns the backend's confirmation message, which
    /// mentions a refund when one was initiated.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not in a cancellable status.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_ref: &str) -> Result<String, ApiError> {
        let path = format!("orders/{}/cancel", encode_segment(order_ref));
        let response: MessageResponse = self.authed::<_, ()>(Method::POST, &path, None).await?;
        Ok(response.message)
    }
}
