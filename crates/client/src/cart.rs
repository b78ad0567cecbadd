//! Cart reconciliation between the guest (local) and server carts.
//!
//! # Modes
//!
//! - **Guest**: lines live in memory and are written through to
//!   [`GuestCartStore`] on every change. Each product appears once.
//! - **Authenticated**: every change is a server call followed by a refetch
//!   through the query cache. The guest cart is not touched.
//!
//! On login the guest cart is merged into the server cart exactly once and
//! local storage is cleared, whether or not the merge succeeded. On logout
//! the service reads the guest cart again.
//!
//! Quantity rules (at least 1, at most `min(stock, 10)`) are checked before
//! any change. A violation produces a warning notice and leaves the cart as
//! it was; it is not an error.

use std::sync::{Arc, Mutex, MutexGuard};

use shopfront_core::{Cart, CartItem, CartLineInput, Product, ProductId, Quantity};
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::cache::{QueryCache, QueryKey};
use crate::error::{ClientError, Result, add_breadcrumb};
use crate::notify::Notifier;
use crate::storage::GuestCartStore;

/// Result of merging the guest cart at login.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The guest lines were sent and the server returned the merged cart.
    Merged(Cart),
    /// There was nothing to merge; no request was made.
    Nothing,
    /// The merge request failed. These lines were discarded.
    Failed { dropped: Vec<CartItem> },
}

/// What an add request turns into after the quantity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddPlan {
    /// Add the requested quantity.
    Add(Quantity),
    /// Add less than requested; the line hits its cap.
    Clamped { add: Quantity, cap: u32 },
    /// The line is already at its cap.
    AtLimit { cap: u32 },
    /// The product is inactive or out of stock.
    Unavailable,
}

impl AddPlan {
    fn new(product: &Product, existing: u32, requested: u32) -> Self {
        if !product.is_purchasable() {
            return Self::Unavailable;
        }
        let cap = product.max_cart_quantity();
        let room = cap.saturating_sub(existing);
        match Quantity::clamped(requested, room) {
            None => Self::AtLimit { cap },
            Some(add) if add.get() < requested => Self::Clamped { add, cap },
            Some(add) => Self::Add(add),
        }
    }
}

fn limit_message(cap: u32) -> String {
    if cap < Quantity::MAX {
        format!("Only {cap} of this item available")
    } else {
        format!("You can add at most {cap} of this item")
    }
}

// =============================================================================
// CartService
// =============================================================================

/// Cart operations that branch on auth state.
#[derive(Clone)]
pub struct CartService {
    inner: Arc<CartServiceInner>,
}

struct CartServiceInner {
    api: ApiClient,
    cache: QueryCache,
    guest_store: GuestCartStore,
    guest: Mutex<Vec<CartItem>>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService").finish_non_exhaustive()
    }
}

impl CartService {
    /// Create the service, loading any saved guest cart.
    #[must_use]
    pub fn new(
        api: ApiClient,
        cache: QueryCache,
        guest_store: GuestCartStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let guest = guest_store.load();
        Self {
            inner: Arc::new(CartServiceInner {
                api,
                cache,
                guest_store,
                guest: Mutex::new(guest),
                notifier,
            }),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.inner.api.tokens().is_authenticated()
    }

    fn guest(&self) -> Result<MutexGuard<'_, Vec<CartItem>>> {
        self.inner
            .guest
            .lock()
            .map_err(|_| ClientError::Internal("guest cart lock poisoned".to_string()))
    }

    fn guest_snapshot(&self) -> Result<Cart> {
        Ok(Cart::from_items(self.guest()?.clone()))
    }

    /// Write the guest lines through to storage and return the new cart.
    fn persist_guest(&self, items: &[CartItem]) -> Result<Cart> {
        self.inner.guest_store.save(items)?;
        Ok(Cart::from_items(items.to_vec()))
    }

    async fn server_cart(&self) -> Result<Cart> {
        let api = &self.inner.api;
        Ok(self
            .inner
            .cache
            .get_with(QueryKey::Cart, || api.get_cart())
            .await?)
    }

    async fn refetch(&self) -> Result<Cart> {
        self.inner.cache.invalidate(&QueryKey::Cart).await;
        self.server_cart().await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The current cart: the server cart when signed in, the guest cart
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cart cannot be fetched.
    pub async fn get_cart(&self) -> Result<Cart> {
        if self.is_authenticated() {
            self.server_cart().await
        } else {
            self.guest_snapshot()
        }
    }

    /// Total units of active products in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cart cannot be fetched.
    pub async fn item_count(&self) -> Result<u32> {
        Ok(self.get_cart().await?.item_count)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// An existing line is incremented. The result is capped at
    /// `min(stock, 10)` with a warning notice when the cap is hit.
    ///
    /// # Errors
    ///
    /// Returns an error if storage or the backend fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: &Product, quantity: u32) -> Result<Cart> {
        if quantity < Quantity::MIN {
            self.inner.notifier.warning("Quantity must be at least 1");
            return self.get_cart().await;
        }

        if self.is_authenticated() {
            self.add_server(product, quantity).await
        } else {
            self.add_guest(product, quantity)
        }
    }

    fn apply_plan(&self, plan: AddPlan, product: &Product) -> Option<Quantity> {
        match plan {
            AddPlan::Unavailable => {
                let message = if product.is_active {
                    "This item is out of stock"
                } else {
                    "This item is no longer available"
                };
                self.inner.notifier.warning(message);
                None
            }
            AddPlan::AtLimit { cap } => {
                self.inner.notifier.warning(&limit_message(cap));
                None
            }
            AddPlan::Clamped { add, cap } => {
                self.inner.notifier.warning(&limit_message(cap));
                Some(add)
            }
            AddPlan::Add(add) => Some(add),
        }
    }

    fn add_guest(&self, product: &Product, quantity: u32) -> Result<Cart> {
        let mut items = self.guest()?;
        let position = items.iter().position(|i| i.product_id == product.id);
        let existing = position
            .and_then(|p| items.get(p))
            .map_or(0, |i| i.quantity);

        let Some(add) = self.apply_plan(AddPlan::new(product, existing, quantity), product) else {
            return Ok(Cart::from_items(items.clone()));
        };

        match position.and_then(|p| items.get_mut(p)) {
            Some(line) => {
                line.quantity = existing + add.get();
                line.product = product.clone();
            }
            None => items.push(CartItem::guest(product.clone(), add)),
        }

        let cart = self.persist_guest(&items)?;
        drop(items);

        debug!(added = add.get(), "Guest cart updated");
        add_breadcrumb("cart", "Added item", Some(&[("mode", "guest")]));
        self.inner.notifier.success("Added to cart");
        Ok(cart)
    }

    async fn add_server(&self, product: &Product, quantity: u32) -> Result<Cart> {
        let current = self.server_cart().await?;
        let existing = current.find(product.id).map_or(0, |i| i.quantity);

        let Some(add) = self.apply_plan(AddPlan::new(product, existing, quantity), product) else {
            return Ok(current);
        };

        let line = CartLineInput {
            product_id: product.id,
            quantity: add,
        };
        self.inner.api.add_to_cart(&line).await?;

        add_breadcrumb("cart", "Added item", Some(&[("mode", "server")]));
        self.inner.notifier.success("Added to cart");
        self.refetch().await
    }

    /// Set the quantity of the line holding `product_id`.
    ///
    /// Values below 1 or above `min(stock, 10)` are rejected with a warning
    /// notice and the cart is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the product is not in the cart,
    /// or an error if storage or the backend fails.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) -> Result<Cart> {
        let cart = self.get_cart().await?;
        let Some(line) = cart.find(product_id) else {
            return Err(ClientError::Validation(
                "That item is not in your cart".to_string(),
            ));
        };

        let cap = line.product.max_cart_quantity();
        if quantity < Quantity::MIN {
            self.inner.notifier.warning("Quantity must be at least 1");
            return Ok(cart);
        }
        if quantity > cap {
            self.inner.notifier.warning(&limit_message(cap));
            return Ok(cart);
        }
        let quantity = Quantity::new(quantity)?;

        if self.is_authenticated() {
            let Some(item_id) = line.id else {
                return Err(ClientError::Internal("server cart line without id".to_string()));
            };
            self.inner.api.update_cart_item(item_id, quantity).await?;
            return self.refetch().await;
        }

        let mut items = self.guest()?;
        if let Some(line) = items.iter_mut().find(|i| i.product_id == product_id) {
            line.quantity = quantity.get();
        }
        self.persist_guest(&items)
    }

    /// Remove the line holding `product_id`. Removing a product that is not
    /// in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if storage or the backend fails.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<Cart> {
        if self.is_authenticated() {
            let cart = self.server_cart().await?;
            let Some(item_id) = cart.find(product_id).and_then(|line| line.id) else {
                return Ok(cart);
            };
            self.inner.api.remove_cart_item(item_id).await?;
            return self.refetch().await;
        }

        let mut items = self.guest()?;
        items.retain(|i| i.product_id != product_id);
        self.persist_guest(&items)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns an error if storage or the backend fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart> {
        if self.is_authenticated() {
            self.inner.api.clear_cart().await?;
            self.inner.cache.put(QueryKey::Cart, Cart::empty()).await;
            return Ok(Cart::empty());
        }

        let mut items = self.guest()?;
        items.clear();
        self.persist_guest(&items)
    }

    // =========================================================================
    // Auth transitions
    // =========================================================================

    /// Send the guest cart to the server once, right after login.
    ///
    /// Local guest storage is cleared afterwards regardless of the outcome.
    /// A failed merge is not retried; the user is told which lines were lost.
    #[instrument(skip(self))]
    pub async fn merge_guest_cart(&self) -> MergeOutcome {
        let pending = match self.guest() {
            Ok(mut guest) => std::mem::take(&mut *guest),
            Err(e) => {
                warn!(error = %e, "Guest cart unavailable for merge");
                Vec::new()
            }
        };
        // Lines persisted by another process since startup count too.
        let pending = if pending.is_empty() {
            self.inner.guest_store.load()
        } else {
            pending
        };

        if let Err(e) = self.inner.guest_store.clear() {
            warn!(error = %e, "Failed to clear guest cart after login");
        }

        let lines: Vec<CartLineInput> = pending
            .iter()
            .filter_map(Option::<CartLineInput>::from)
            .collect();

        if lines.is_empty() {
            debug!("No guest cart to merge");
            return MergeOutcome::Nothing;
        }

        match self.inner.api.merge_cart(&lines).await {
            Ok(cart) => {
                info!(lines = lines.len(), "Guest cart merged");
                self.inner.cache.put(QueryKey::Cart, cart.clone()).await;
                MergeOutcome::Merged(cart)
            }
            Err(e) => {
                warn!(error = %e, lines = lines.len(), "Guest cart merge failed, discarding");
                self.inner.cache.invalidate(&QueryKey::Cart).await;
                let count = pending.len();
                self.inner.notifier.warning(&format!(
                    "We couldn't move {count} item(s) from your guest cart. Please add them again."
                ));
                MergeOutcome::Failed { dropped: pending }
            }
        }
    }

    /// Re-read the guest cart from storage (after logout, or when another
    /// process may have changed it).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory cart is unavailable.
    pub fn reload_guest(&self) -> Result<Cart> {
        let items = self.inner.guest_store.load();
        let mut guest = self.guest()?;
        guest.clone_from(&items);
        Ok(Cart::from_items(items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::ProductId;

    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: ProductId::new(uuid::Uuid::new_v4()),
            name: "Ragi Flour".to_string(),
            slug: "ragi-flour".to_string(),
            description: String::new(),
            short_description: None,
            price: Decimal::new(95, 0),
            mrp: Decimal::new(110, 0),
            stock,
            images: Vec::new(),
            specifications: serde_json::Value::Null,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_plan_adds_within_cap() {
        let p = product(50);
        assert_eq!(
            AddPlan::new(&p, 0, 3),
            AddPlan::Add(Quantity::new(3).unwrap())
        );
    }

    #[test]
    fn test_plan_clamps_to_stock() {
        let p = product(4);
        assert_eq!(
            AddPlan::new(&p, 1, 5),
            AddPlan::Clamped {
                add: Quantity::new(3).unwrap(),
                cap: 4
            }
        );
    }

    #[test]
    fn test_plan_clamps_to_hard_cap() {
        let p = product(100);
        assert_eq!(
            AddPlan::new(&p, 8, 5),
            AddPlan::Clamped {
                add: Quantity::new(2).unwrap(),
                cap: 10
            }
        );
        assert_eq!(AddPlan::new(&p, 10, 1), AddPlan::AtLimit { cap: 10 });
    }

    #[test]
    fn test_plan_rejects_unavailable() {
        assert_eq!(AddPlan::new(&product(0), 0, 1), AddPlan::Unavailable);

        let mut inactive = product(5);
        inactive.is_active = false;
        assert_eq!(AddPlan::new(&inactive, 0, 1), AddPlan::Unavailable);
    }

    #[test]
    fn test_limit_message() {
        assert_eq!(limit_message(3), "Only 3 of this item available");
        assert_eq!(limit_message(10), "You can add at most 10 of this item");
    }
}
