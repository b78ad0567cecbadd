//! Cart line quantity.
//!
//! A cart line holds between 1 and [`Quantity::MAX`] units, and never more
//! than the product has in stock.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity below one.
    #[error("quantity must be at least {min}")]
    TooSmall {
        /// Smallest accepted quantity.
        min: u32,
    },
    /// Quantity above the per-line cap.
    #[error("quantity cannot exceed {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
}

/// A validated cart line quantity in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity on a cart line.
    pub const MIN: u32 = 1;
    /// Hard cap on units per cart line.
    pub const MAX: u32 = 10;
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Validate a quantity against the `1..=10` range.
    ///
    /// # Errors
    ///
    /// Returns an error when `n` is outside the accepted range.
    pub const fn new(n: u32) -> Result<Self, QuantityError> {
        if n < Self::MIN {
            Err(QuantityError::TooSmall { min: Self::MIN })
        } else if n > Self::MAX {
            Err(QuantityError::TooLarge { max: Self::MAX })
        } else {
            Ok(Self(n))
        }
    }

    /// Largest quantity a line may hold for a product with `stock` units.
    #[must_use]
    pub const fn cap_for_stock(stock: u32) -> u32 {
        if stock < Self::MAX { stock } else { Self::MAX }
    }

    /// Clamp `n` to `min(stock, 10)`.
    ///
    /// Returns `None` when the result would be zero (nothing in stock, or
    /// `n == 0`).
    #[must_use]
    pub const fn clamped(n: u32, stock: u32) -> Option<Self> {
        let cap = Self::cap_for_stock(stock);
        let n = if n < cap { n } else { cap };
        if n == 0 { None } else { Some(Self(n)) }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bounds() {
        assert_eq!(Quantity::new(0), Err(QuantityError::TooSmall { min: 1 }));
        assert_eq!(Quantity::new(1).unwrap().get(), 1);
        assert_eq!(Quantity::new(10).unwrap().get(), 10);
        assert_eq!(Quantity::new(11), Err(QuantityError::TooLarge { max: 10 }));
    }

    #[test]
    fn test_clamped_respects_stock_and_cap() {
        assert_eq!(Quantity::clamped(5, 3).unwrap().get(), 3);
        assert_eq!(Quantity::clamped(15, 50).unwrap().get(), 10);
        assert_eq!(Quantity::clamped(4, 50).unwrap().get(), 4);
        assert!(Quantity::clamped(4, 0).is_none());
        assert!(Quantity::clamped(0, 5).is_none());
    }

    #[test]
    fn test_clamped_never_exceeds_min_stock_cap() {
        for stock in 0..20 {
            for n in 0..20 {
                if let Some(q) = Quantity::clamped(n, stock) {
                    assert!(q.get() <= stock.min(Quantity::MAX));
                }
            }
        }
    }

    #[test]
    fn test_serde_validates() {
        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(q.get(), 3);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("11").is_err());
        assert_eq!(serde_json::to_string(&q).unwrap(), "3");
    }
}
