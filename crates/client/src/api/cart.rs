//! Server cart endpoints. All require a signed-in user.

use reqwest::Method;
use shopfront_core::{Cart, CartItem, CartItemId, CartLineInput, CartQuantityUpdate, Quantity};
use tracing::instrument;

use super::auth::MessageResponse;
use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.authed::<_, ()>(Method::GET, "cart", None).await
    }

    /// Add a product, incrementing the line if the product is already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unavailable or out of stock.
    #[instrument(skip(self), fields(product_id = %line.product_id))]
    pub async fn add_to_cart(&self, line: &CartLineInput) -> Result<CartItem, ApiError> {
        self.authed(Method::POST, "cart/add", Some(line)).await
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is missing or stock is insufficient.
    #[instrument(skip(self))]
    pub async fn update_cart_item(
        &self,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, ApiError> {
        let body = CartQuantityUpdate { quantity };
        self.authed(Method::PUT, &format!("cart/{item_id}"), Some(&body))
            .await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is missing or the request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .authed::<_, ()>(Method::DELETE, &format!("cart/{item_id}"), None)
            .await?;
        Ok(())
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let _: MessageResponse = self.authed::<_, ()>(Method::POST, "cart/clear", None).await?;
        Ok(())
    }

    /// Merge guest lines into the server cart and return the result.
    ///
    /// The backend skips inactive products and clamps each merged line to
    /// `min(existing + added, 10, stock)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn merge_cart(&self, lines: &[CartLineInput]) -> Result<Cart, ApiError> {
        self.authed(Method::POST, "cart/merge", Some(lines)).await
    }
}
