//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `client` - API client, auth, cart reconciliation and checkout
//! - `cli` - The `shopfront` terminal storefront
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no storage. Wire types mirror the JSON bodies of the REST
//! backend (`/api/v1`), so they can be deserialized directly from responses.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, quantities, statuses and entity types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
