//! Secret store backends
//!
//! A backend is a platform credential store behind the [`SecretBackend`]
//! capability: the OS keychain in production, an in-memory map in tests.
//! Which backend is active at any moment is decided by the [`BackendSelector`].

mod keychain;
mod memory;
mod selector;

use crate::credential::Passphrase;
use crate::error::Result;

pub use keychain::KeychainBackend;
pub use memory::MemoryBackend;
pub use selector::BackendSelector;

/// Capability contract a platform secret store must satisfy
///
/// All operations are synchronous; scheduling and change notification live in
/// the layer above. Implementations map their native failure modes onto
/// [`KeywardenError::BackendAccess`](crate::KeywardenError::BackendAccess).
pub trait SecretBackend: Send + Sync {
    /// Store a passphrase under the given key, overwriting any existing one
    ///
    /// The display name is advisory and only used where the native store can
    /// show a human-readable label; `None` must not cause failure.
    fn store(&self, key: &str, display_name: Option<&str>, passphrase: &str) -> Result<()>;

    /// Load the passphrase stored under the given key
    ///
    /// Returns `Ok(None)` if nothing was ever stored; absence is not an error.
    fn load(&self, key: &str) -> Result<Option<Passphrase>>;

    /// Delete the passphrase stored under the given key
    ///
    /// Deleting an absent key is a no-op success.
    fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a passphrase is stored under the given key
    ///
    /// Cheap presence query; implementations degrade internal faults to
    /// `false` rather than failing.
    fn exists(&self, key: &str) -> bool;
}
