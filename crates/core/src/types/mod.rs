//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the entity types exchanged with the storefront backend.

pub mod address;
pub mod cart;
pub mod id;
pub mod mobile;
pub mod order;
pub mod payment;
pub mod pincode;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;
pub mod timestamp;
pub mod user;

pub use address::{Address, AddressError, AddressInput, AddressUpdate};
pub use cart::{Cart, CartItem, CartLineInput, CartQuantityUpdate};
pub use id::*;
pub use mobile::{MobileError, MobileNumber, Otp, OtpError};
pub use order::{
    Order, OrderCreate, OrderEstimate, OrderItem, OrderList, OrderTracking, ShippingSnapshot,
};
pub use payment::{Payment, PaymentCreate, PaymentIntent, PaymentVerification};
pub use pincode::{Pincode, PincodeError};
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductList};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
pub use user::{User, UserUpdate};
