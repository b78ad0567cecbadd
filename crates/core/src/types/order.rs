//! Order types and the checkout fee rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{AddressId, OrderId, OrderItemId, ProductId};
use super::price::Price;
use super::status::{AddressType, OrderStatus};

/// Delivery details copied onto the order when it is placed.
///
/// Serialized flat, as `shipping_*` fields of the order body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSnapshot {
    #[serde(rename = "shipping_name")]
    pub name: String,
    #[serde(rename = "shipping_mobile")]
    pub mobile: String,
    #[serde(rename = "shipping_line1")]
    pub line1: String,
    #[serde(rename = "shipping_line2", default)]
    pub line2: Option<String>,
    #[serde(rename = "shipping_city")]
    pub city: String,
    #[serde(rename = "shipping_state")]
    pub state: String,
    #[serde(rename = "shipping_pincode")]
    pub pincode: String,
    #[serde(rename = "shipping_country")]
    pub country: String,
    #[serde(rename = "shipping_email", default)]
    pub email: Option<String>,
    #[serde(rename = "shipping_address_type", default)]
    pub address_type: AddressType,
}

/// A line on a placed order, priced at the time of ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(flatten)]
    pub shipping: ShippingSnapshot,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Order total as a rupee price.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::inr(self.total)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// One page of the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderList {
    pub items: Vec<Order>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Shipment tracking for an order.
///
/// Shipment fields are empty until a shipment has been booked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTracking {
    pub order_number: String,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub shipment_status: Option<String>,
    #[serde(default)]
    pub courier_name: Option<String>,
    #[serde(default)]
    pub awb_number: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub tracking_history: Vec<serde_json::Value>,
    #[serde(default, with = "super::timestamp::option")]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub address_id: AddressId,
}

/// Client-side estimate of order totals for the checkout summary.
///
/// Mirrors the backend's fee rules. The totals on the created [`Order`]
/// remain authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderEstimate {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderEstimate {
    /// Subtotal at which shipping becomes free.
    pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
    /// Flat shipping fee below the threshold (50.00).
    pub const SHIPPING_FEE: Decimal = Decimal::from_parts(5000, 0, 0, false, 2);
    /// GST rate (18%).
    pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

    /// Compute shipping, tax and total for a cart subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping_fee = if subtotal >= Self::FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            Self::SHIPPING_FEE
        };
        let tax = (subtotal * Self::TAX_RATE).round_dp(2);

        Self {
            subtotal,
            shipping_fee,
            tax,
            total: subtotal + shipping_fee + tax,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_below_free_shipping() {
        let estimate = OrderEstimate::from_subtotal(Decimal::new(39_900, 2));
        assert_eq!(estimate.shipping_fee, Decimal::new(5_000, 2));
        assert_eq!(estimate.tax, Decimal::new(7_182, 2));
        assert_eq!(estimate.total, Decimal::new(52_082, 2));
    }

    #[test]
    fn test_estimate_free_shipping_at_threshold() {
        let estimate = OrderEstimate::from_subtotal(Decimal::new(500, 0));
        assert_eq!(estimate.shipping_fee, Decimal::ZERO);
        assert_eq!(estimate.tax, Decimal::new(90, 0));
        assert_eq!(estimate.total, Decimal::new(590, 0));
    }

    #[test]
    fn test_deserialize_order_with_flat_shipping_fields() {
        let json = r#"{
            "id": "3d6f0a52-8c1e-4b7a-9f2d-5e6a7b8c9d0e",
            "order_number": "ORD250131101500AB12",
            "status": "pending",
            "subtotal": "399.00",
            "shipping_fee": "50.00",
            "tax": "71.82",
            "discount": "0.00",
            "total": "520.82",
            "shipping_name": "Asha Rao",
            "shipping_mobile": "9876543210",
            "shipping_line1": "12 MG Road",
            "shipping_line2": null,
            "shipping_city": "Bengaluru",
            "shipping_state": "Karnataka",
            "shipping_pincode": "560001",
            "shipping_country": "India",
            "shipping_email": null,
            "shipping_address_type": "home",
            "items": [{
                "id": "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d",
                "product_id": "6f1c2a7e-3b8d-4c55-9a0e-2d7f4b1e9c30",
                "product_name": "Cold Pressed Coconut Oil",
                "product_image": null,
                "quantity": 1,
                "price": "399.00",
                "total": "399.00"
            }],
            "created_at": "2025-01-31T10:15:00",
            "updated_at": "2025-01-31T10:15:00"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping.city, "Bengaluru");
        assert_eq!(order.unit_count(), 1);
        assert_eq!(order.total_price().display(), "₹520.82");
    }
}
