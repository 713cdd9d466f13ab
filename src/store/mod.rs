//! Persisted credential storage.
//!
//! DESIGN
//! ======
//! The interface is a string key-value store with the same two well-known
//! keys the web client kept in browser storage: `token` and `user` (the user
//! serialized as JSON). The manager always writes and clears the pair
//! together, so a store never holds a user without its token across a
//! completed operation.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Storage key for the bearer token.
pub const KEY_TOKEN: &str = "token";
/// Storage key for the serialized cached user record.
pub const KEY_USER: &str = "user";

/// Persistent string key-value storage for session credentials.
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// Lets an embedder keep a handle on the store it hands to the manager.
impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
