//! Cart types shared by the guest (local) and authenticated (server) carts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::price::Price;
use super::product::Product;
use super::quantity::Quantity;

/// A single cart line.
///
/// Guest lines live only in local storage and have no server id. Lines from
/// the server cart always carry one, and it is the handle for update and
/// remove calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartItemId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub product: Product,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::option"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl CartItem {
    /// Create a guest line from a product snapshot.
    #[must_use]
    pub fn guest(product: Product, quantity: Quantity) -> Self {
        Self {
            id: None,
            product_id: product.id,
            quantity: quantity.get(),
            product,
            created_at: None,
        }
    }

    /// Line total (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// Whether this line counts toward the subtotal.
    #[must_use]
    pub const fn is_countable(&self) -> bool {
        self.product.is_active
    }
}

/// A full cart: its lines plus the totals derived from active products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub item_count: u32,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            item_count: 0,
        }
    }

    /// Build a cart from its lines, totalling only active products.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let (subtotal, item_count) = items
            .iter()
            .filter(|item| item.is_countable())
            .fold((Decimal::ZERO, 0_u32), |(subtotal, count), item| {
                (subtotal + item.line_total(), count.saturating_add(item.quantity))
            });

        Self {
            items,
            subtotal,
            item_count,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn find(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Subtotal as a rupee price.
    #[must_use]
    pub const fn subtotal_price(&self) -> Price {
        Price::inr(self.subtotal)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

/// Body of `POST /cart/add` and one element of `POST /cart/merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl From<&CartItem> for Option<CartLineInput> {
    fn from(item: &CartItem) -> Self {
        Quantity::new(item.quantity)
            .ok()
            .map(|quantity| CartLineInput {
                product_id: item.product_id,
                quantity,
            })
    }
}

/// Body of `PUT /cart/{item_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartQuantityUpdate {
    pub quantity: Quantity,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::tests::sample_product;

    #[test]
    fn test_from_items_skips_inactive_products() {
        let active = CartItem::guest(sample_product(5), Quantity::new(2).unwrap());
        let mut gone = sample_product(5);
        gone.is_active = false;
        let inactive = CartItem::guest(gone, Quantity::new(3).unwrap());

        let cart = Cart::from_items(vec![active, inactive]);
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.subtotal, Decimal::new(79_800, 2));
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::from_items(Vec::new());
        assert!(cart.is_empty());
        assert_eq!(cart, Cart::empty());
    }

    #[test]
    fn test_guest_item_serializes_without_server_fields() {
        let item = CartItem::guest(sample_product(5), Quantity::ONE);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_line_input_from_item() {
        let mut item = CartItem::guest(sample_product(5), Quantity::ONE);
        let line: Option<CartLineInput> = (&item).into();
        assert_eq!(line.unwrap().quantity, Quantity::ONE);

        item.quantity = 0;
        let line: Option<CartLineInput> = (&item).into();
        assert!(line.is_none());
    }
}
