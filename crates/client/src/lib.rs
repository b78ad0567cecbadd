//! Shopfront client library.
//!
//! Talks to the storefront REST backend and keeps the client-side state a
//! storefront needs between calls:
//! - Guest cart in local storage, merged into the server cart at login
//! - Access/refresh tokens with refresh-and-retry on 401
//! - Two-phase checkout with payment gateway hand-off
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopfront_client::{ClientConfig, NoticeQueue, Storefront, Stores};
//!
//! let config = ClientConfig::from_env()?;
//! let notices = NoticeQueue::new();
//! let shop = Storefront::new(config.clone(), Stores::in_dir(&config.data_dir), Arc::new(notices.clone()))?;
//!
//! let product = shop.product("cold-pressed-coconut-oil").await?;
//! shop.cart().add_item(&product, 2).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cache;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod payment;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::AuthSession;
pub use cart::{CartService, MergeOutcome};
pub use checkout::{CheckoutFlow, CheckoutOutcome};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use notify::{Notice, NoticeLevel, NoticeQueue, Notifier};
pub use payment::{PaymentContext, PaymentOutcome, PaymentProvider};
pub use state::{Storefront, Stores};
pub use storage::{AuthState, AuthTransition};
