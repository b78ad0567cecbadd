//! Subcommand implementations.
//!
//! Each command renders one storefront "page". Errors bubble up to `main`,
//! which prints [`shopfront_client::ClientError::user_message`].

pub mod account;
pub mod cart;
pub mod catalogue;
pub mod checkout;
pub mod orders;
pub mod session;
