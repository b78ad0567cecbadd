//! Guest cart persistence.

use std::sync::Arc;

use shopfront_core::{CartItem, Quantity};
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError, keys};

/// Stores the guest cart as a JSON array of cart lines.
#[derive(Clone)]
pub struct GuestCartStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for GuestCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestCartStore").finish_non_exhaustive()
    }
}

impl GuestCartStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the saved lines.
    ///
    /// Unreadable or malformed data is logged and treated as an empty cart.
    /// Lines are combined per product and clamped to `min(stock, 10)`, since
    /// another process may have written the key.
    #[must_use]
    pub fn load(&self) -> Vec<CartItem> {
        let raw = match self.store.get(keys::GUEST_CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read guest cart");
                return Vec::new();
            }
        };

        let lines: Vec<CartItem> = match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "Discarding malformed guest cart");
                return Vec::new();
            }
        };

        let stored = lines.len();
        let lines = normalize(lines);
        if lines.len() != stored {
            debug!(stored, kept = lines.len(), "Normalized stored guest cart");
        }
        lines
    }

    /// Replace the saved lines. An empty list removes the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        if items.is_empty() {
            return self.clear();
        }
        let encoded = serde_json::to_string(items).map_err(|source| StorageError::Encode {
            key: keys::GUEST_CART,
            source,
        })?;
        self.store.set(keys::GUEST_CART, &encoded)
    }

    /// Remove the saved cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::GUEST_CART)
    }

    /// Whether anything is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }
}

/// One line per product, each within `min(stock, 10)`. Empty lines are dropped.
fn normalize(lines: Vec<CartItem>) -> Vec<CartItem> {
    let mut combined: Vec<CartItem> = Vec::with_capacity(lines.len());
    for line in lines {
        match combined.iter_mut().find(|c| c.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => combined.push(line),
        }
    }

    combined
        .into_iter()
        .filter_map(|line| {
            let quantity = Quantity::clamped(line.quantity, line.product.available_stock())?;
            Some(CartItem::guest(line.product, quantity))
        })
        .collect()
}
