//! # ferry-store
//!
//! Device-local persistence for the ferry clients.
//!
//! Two kinds of backing store sit behind the [`KeyValueStore`] trait:
//! a secure one for tokens (OS keychain via `keyring`) and a plain one for
//! everything else (a JSON file with owner-only permissions). [`DeviceStorage`]
//! is the typed facade the HTTP client and offline queue use.

mod device;
mod error;
mod file;
mod keychain;
mod memory;

pub use device::DeviceStorage;
pub use error::StoreError;
pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// A string-to-string store. Implementations must be safe to share between
/// tasks; every call is a complete read or write.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
