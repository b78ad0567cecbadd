//! Local persistence.
//!
//! Everything the client keeps between runs goes through [`KeyValueStore`],
//! a synchronous string-to-string contract. Tokens and the guest cart sit
//! behind separate typed wrappers ([`TokenStore`], [`GuestCartStore`]) so
//! each can be backed by a different store.

mod file;
mod guest_cart;
mod memory;
mod tokens;

pub use file::FileStore;
pub use guest_cart::GuestCartStore;
pub use memory::MemoryStore;
pub use tokens::{AuthState, AuthTransition, TokenStore, Tokens};

use std::path::PathBuf;

use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Bearer token attached to authenticated requests.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Token exchanged for a new access token after a 401.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// JSON array of guest cart lines.
    pub const GUEST_CART: &str = "guest_cart";
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be encoded.
    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A thread panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A synchronous key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
