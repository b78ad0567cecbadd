//! Profile and address book endpoints.

use reqwest::Method;
use shopfront_core::{Address, AddressId, AddressInput, AddressUpdate, User, UserUpdate};
use tracing::instrument;

use super::auth::MessageResponse;
use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Profile Methods
    // =========================================================================

    /// Get the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.authed::<_, ()>(Method::GET, "users/me", None).await
    }

    /// Update name and/or email.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_me(&self, update: &UserUpdate) -> Result<User, ApiError> {
        self.authed(Method::PUT, "users/me", Some(update)).await
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// List saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.authed::<_, ()>(Method::GET, "users/me/addresses", None)
            .await
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the address.
    #[instrument(skip(self, input))]
    pub async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        self.authed(Method::POST, "users/me/addresses", Some(input))
            .await
    }

    /// Change fields of a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not found.
    #[instrument(skip(self, update))]
    pub async fn update_address(
        &self,
        id: AddressId,
        update: &AddressUpdate,
    ) -> Result<Address, ApiError> {
        self.authed(Method::PUT, &format!("users/me/addresses/{id}"), Some(update))
            .await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not found.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .authed::<_, ()>(Method::DELETE, &format!("users/me/addresses/{id}"), None)
            .await?;
        Ok(())
    }
}
