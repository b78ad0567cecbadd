//! Product catalogue types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::quantity::Quantity;

/// A product as returned by the catalogue endpoints.
///
/// Cart items embed a full snapshot of this type so the guest cart can be
/// rendered without a network round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    pub price: Decimal,
    pub mrp: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: serde_json::Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Units in stock, treating negative counts as zero.
    #[must_use]
    pub fn available_stock(&self) -> u32 {
        u32::try_from(self.stock.max(0)).unwrap_or(u32::MAX)
    }

    /// Largest quantity a single cart line may hold, `min(stock, 10)`.
    #[must_use]
    pub fn max_cart_quantity(&self) -> u32 {
        Quantity::cap_for_stock(self.available_stock())
    }

    /// Whether the product can be added to a cart at all.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.stock > 0
    }

    /// First image, used as the thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Selling price in rupees.
    #[must_use]
    pub const fn selling_price(&self) -> Price {
        Price::inr(self.price)
    }

    /// Whole-percent discount against the MRP, rounded down.
    #[must_use]
    pub fn discount_percentage(&self) -> u32 {
        if self.mrp <= Decimal::ZERO || self.price >= self.mrp {
            return 0;
        }
        let pct = ((self.mrp - self.price) / self.mrp * Decimal::ONE_HUNDRED).trunc();
        pct.to_u32().unwrap_or(0)
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl ProductList {
    /// Whether a further page exists.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_product(stock: i64) -> Product {
        Product {
            id: ProductId::new(uuid::Uuid::new_v4()),
            name: "Cold Pressed Coconut Oil".to_string(),
            slug: "cold-pressed-coconut-oil".to_string(),
            description: "500ml glass bottle".to_string(),
            short_description: None,
            price: Decimal::new(39_900, 2),
            mrp: Decimal::new(49_900, 2),
            stock,
            images: vec!["https://cdn.example.com/oil.jpg".to_string()],
            specifications: serde_json::Value::Null,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_max_cart_quantity() {
        assert_eq!(sample_product(3).max_cart_quantity(), 3);
        assert_eq!(sample_product(250).max_cart_quantity(), 10);
        assert_eq!(sample_product(-2).max_cart_quantity(), 0);
    }

    #[test]
    fn test_is_purchasable() {
        assert!(sample_product(1).is_purchasable());
        assert!(!sample_product(0).is_purchasable());

        let mut inactive = sample_product(5);
        inactive.is_active = false;
        assert!(!inactive.is_purchasable());
    }

    #[test]
    fn test_discount_percentage() {
        // (499 - 399) / 499 = 20.04%
        assert_eq!(sample_product(1).discount_percentage(), 20);

        let mut no_mrp = sample_product(1);
        no_mrp.mrp = Decimal::ZERO;
        assert_eq!(no_mrp.discount_percentage(), 0);
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "id": "6f1c2a7e-3b8d-4c55-9a0e-2d7f4b1e9c30",
            "name": "Jaggery Powder",
            "slug": "jaggery-powder",
            "description": "Unrefined",
            "short_description": null,
            "price": "120.00",
            "mrp": "150.00",
            "stock": 12,
            "images": [],
            "specifications": {"weight": "1kg"},
            "is_active": true,
            "created_at": "2025-01-31T10:15:00.123456",
            "updated_at": "2025-01-31T10:15:00.123456"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::new(12_000, 2));
        assert_eq!(product.max_cart_quantity(), 10);
        assert!(product.created_at.is_some());
        assert!(product.primary_image().is_none());
    }

    #[test]
    fn test_has_next_page() {
        let list = ProductList {
            items: vec![],
            total: 45,
            page: 2,
            page_size: 20,
        };
        assert!(list.has_next_page());

        let last = ProductList { page: 3, ..list };
        assert!(!last.has_next_page());
    }
}
