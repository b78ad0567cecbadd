//! Application state shared by every page of the storefront.
//!
//! [`Storefront`] wires the API client, stores, cache and services together
//! and owns the cross-cutting transitions: login merges the guest cart,
//! logout falls back to it, and [`Storefront::sync_auth`] applies a login or
//! logout made by another process.

use std::path::Path;
use std::sync::Arc;

use shopfront_core::{
    Address, AddressId, AddressInput, AddressUpdate, Cart, Order, OrderList, OrderTracking,
    Product, ProductList, User, UserUpdate,
};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, MAX_PAGE_SIZE};
use crate::auth::AuthSession;
use crate::cache::{QueryCache, QueryKey};
use crate::cart::{CartService, MergeOutcome};
use crate::checkout::CheckoutFlow;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result, clear_sentry_user, set_sentry_user};
use crate::notify::Notifier;
use crate::storage::{
    AuthTransition, FileStore, GuestCartStore, KeyValueStore, MemoryStore, TokenStore,
};

/// Backing stores for tokens and the guest cart.
#[derive(Clone)]
pub struct Stores {
    pub tokens: Arc<dyn KeyValueStore>,
    pub guest_cart: Arc<dyn KeyValueStore>,
}

impl Stores {
    /// Keep tokens and the guest cart in the same store.
    #[must_use]
    pub fn shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            tokens: Arc::clone(&store),
            guest_cart: store,
        }
    }

    /// Nothing survives the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }

    /// One JSON file in `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::shared(Arc::new(FileStore::in_dir(dir)))
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// The storefront client.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    api: ApiClient,
    cache: QueryCache,
    auth: AuthSession,
    cart: CartService,
    checkout: CheckoutFlow,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("auth", &self.inner.auth)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Build the client from configuration and stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, stores: Stores, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let tokens = TokenStore::new(stores.tokens);
        let api = ApiClient::new(&config, tokens)?;
        let cache = QueryCache::new(config.cache_ttl);

        let auth = AuthSession::new(api.clone(), cache.clone(), Arc::clone(&notifier));
        let cart = CartService::new(
            api.clone(),
            cache.clone(),
            GuestCartStore::new(stores.guest_cart),
            Arc::clone(&notifier),
        );
        let checkout = CheckoutFlow::new(
            api.clone(),
            cache.clone(),
            cart.clone(),
            notifier,
            config.app_name.clone(),
        );

        debug!(api_url = %config.api_url, state = ?auth.state(), "Storefront initialized");

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                cache,
                auth,
                cart,
                checkout,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Raw API access.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn auth(&self) -> &AuthSession {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutFlow {
        &self.inner.checkout
    }

    fn require_login(&self) -> Result<()> {
        if self.inner.auth.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Verify the login code, then merge the guest cart into the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails. Merge failures are reported
    /// through the outcome and a notice.
    #[instrument(skip(self, otp))]
    pub async fn login(&self, mobile: &str, otp: &str) -> Result<MergeOutcome> {
        self.inner.auth.verify_otp(mobile, otp).await?;
        let merged = self.inner.cart.merge_guest_cart().await;

        match self.me().await {
            Ok(user) => set_sentry_user(&user.id),
            Err(e) => warn!(error = %e, "Could not load profile after login"),
        }

        Ok(merged)
    }

    /// Sign out and return to the guest cart.
    ///
    /// # Errors
    ///
    /// Returns an error if local tokens could not be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Cart> {
        let result = self.inner.auth.logout().await;
        let cart = self.inner.cart.reload_guest()?;
        result.map(|()| cart)
    }

    /// Apply a login or logout performed by another process sharing storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    #[instrument(skip(self))]
    pub async fn sync_auth(&self) -> Result<Option<(AuthTransition, Option<MergeOutcome>)>> {
        let Some(transition) = self.inner.auth.sync_from_storage()? else {
            return Ok(None);
        };
        info!(?transition, "Auth state changed in another process");

        match transition {
            AuthTransition::LoggedIn => {
                self.inner.cache.invalidate_private();
                // The other process may already have merged and cleared it.
                self.inner.cart.reload_guest()?;
                let merged = self.inner.cart.merge_guest_cart().await;
                Ok(Some((transition, Some(merged))))
            }
            AuthTransition::LoggedOut => {
                self.inner.cache.clear();
                clear_sentry_user();
                self.inner.cart.reload_guest()?;
                Ok(Some((transition, None)))
            }
        }
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// One page of active products. `page_size` is capped at 50.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products(&self, page: u32, page_size: u32) -> Result<ProductList> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Products { page, page_size }, || {
                api.list_products(page, page_size)
            })
            .await?)
    }

    /// A product by id or slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    pub async fn product(&self, id_or_slug: &str) -> Result<Product> {
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Product(id_or_slug.to_string()), || {
                api.get_product(id_or_slug)
            })
            .await?)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` when signed out.
    pub async fn me(&self) -> Result<User> {
        self.require_login()?;
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Me, || api.get_me())
            .await?)
    }

    /// Update name and/or email.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if nothing would change.
    pub async fn update_me(&self, update: &UserUpdate) -> Result<User> {
        self.require_login()?;
        if update.name.is_none() && update.email.is_none() {
            return Err(ClientError::Validation("Nothing to update".to_string()));
        }
        let user = self.inner.api.update_me(update).await?;
        self.inner.cache.put(QueryKey::Me, user.clone()).await;
        Ok(user)
    }

    /// Saved delivery addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` when signed out.
    pub async fn addresses(&self) -> Result<Vec<Address>> {
        self.require_login()?;
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Addresses, || api.list_addresses())
            .await?)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for invalid fields.
    pub async fn add_address(&self, input: &AddressInput) -> Result<Address> {
        self.require_login()?;
        input.validate()?;
        let address = self.inner.api.create_address(input).await?;
        self.inner.cache.invalidate(&QueryKey::Addresses).await;
        Ok(address)
    }

    /// Change fields of a saved address.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for invalid fields or an empty update.
    pub async fn update_address(&self, id: AddressId, update: &AddressUpdate) -> Result<Address> {
        self.require_login()?;
        if update.is_empty() {
            return Err(ClientError::Validation("Nothing to update".to_string()));
        }
        update.validate()?;
        let address = self.inner.api.update_address(id, update).await?;
        self.inner.cache.invalidate(&QueryKey::Addresses).await;
        Ok(address)
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not exist.
    pub async fn remove_address(&self, id: AddressId) -> Result<()> {
        self.require_login()?;
        self.inner.api.delete_address(id).await?;
        self.inner.cache.invalidate(&QueryKey::Addresses).await;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// One page of the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` when signed out.
    pub async fn orders(&self, page: u32, page_size: u32) -> Result<OrderList> {
        self.require_login()?;
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Orders { page, page_size }, || {
                api.list_orders(page, page_size)
            })
            .await?)
    }

    /// An order by id or order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist.
    pub async fn order(&self, order_ref: &str) -> Result<Order> {
        self.require_login()?;
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Order(order_ref.to_string()), || {
                api.get_order(order_ref)
            })
            .await?)
    }

    /// Shipment tracking for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist.
    pub async fn track_order(&self, order_ref: &str) -> Result<OrderTracking> {
        self.require_login()?;
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Tracking(order_ref.to_string()), || {
                api.track_order(order_ref)
            })
            .await?)
    }

    /// Cancel an order that has not shipped.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when the order's status does not
    /// allow cancelling.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_ref: &str) -> Result<String> {
        self.require_login()?;
        let order = self.inner.api.get_order(order_ref).await?;
        if !order.status.is_cancellable() {
            return Err(ClientError::Validation(format!(
                "Order {} cannot be cancelled once {}",
                order.order_number, order.status
            )));
        }

        let message = self.inner.api.cancel_order(order_ref).await?;
        self.inner.cache.invalidate_orders();
        info!(order_number = %order.order_number, "Order cancelled");
        Ok(message)
    }
}
