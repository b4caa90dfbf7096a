//! Credential manager facade

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Passphrase;
use crate::backend::{BackendSelector, SecretBackend};
use crate::error::{KeywardenError, Result};
use crate::notify::NotificationContext;
use crate::presence::{PresenceFlag, PresenceRegistry};

/// Facade over the active secret store backend
///
/// Orchestrates backend calls, keeps per-key presence flags consistent with
/// confirmed backend outcomes, and marshals flag updates onto the
/// notification context. Operations may be called from any thread; backend
/// mutations block until the store answers.
pub struct CredentialManager {
    /// Swappable handle to the active backend
    selector: BackendSelector,
    /// Per-key observable presence flags
    registry: PresenceRegistry,
    /// Designated context for observable-state writes
    notifier: Arc<dyn NotificationContext>,
}

impl CredentialManager {
    /// Create a new credential manager
    pub fn new(selector: BackendSelector, notifier: Arc<dyn NotificationContext>) -> Self {
        Self {
            selector,
            registry: PresenceRegistry::new(),
            notifier,
        }
    }

    /// Store a passphrase under the given key, overwriting any existing one
    ///
    /// On success the presence flag for `key` flips to true; on backend
    /// failure the error propagates and presence state is left untouched.
    pub fn store_passphrase(
        &self,
        key: &str,
        display_name: Option<&str>,
        passphrase: &str,
    ) -> Result<()> {
        let backend = self.resolve_backend()?;
        backend.store(key, display_name, passphrase)?;

        info!("Stored passphrase for key: {}", key);
        self.set_stored(key, true);
        Ok(())
    }

    /// Load the passphrase stored under the given key
    ///
    /// `Ok(None)` means nothing was ever stored - the common first-run case,
    /// distinct from a backend fault. Presence state is not touched. The
    /// returned buffer is the caller's copy; the manager keeps no reference.
    pub fn load_passphrase(&self, key: &str) -> Result<Option<Passphrase>> {
        let backend = self.resolve_backend()?;
        let loaded = backend.load(key)?;

        debug!("Loaded passphrase for key: {}", key);
        Ok(loaded)
    }

    /// Delete the passphrase stored under the given key
    ///
    /// Idempotent: deleting a never-stored key succeeds. On success the
    /// presence flag for `key` flips to false whether or not a secret existed.
    pub fn delete_passphrase(&self, key: &str) -> Result<()> {
        let backend = self.resolve_backend()?;
        backend.delete(key)?;

        info!("Deleted passphrase for key: {}", key);
        self.set_stored(key, false);
        Ok(())
    }

    /// Replace the passphrase stored under the given key
    ///
    /// An unconditional overwrite: no prior secret is required, and no
    /// separate delete happens first.
    pub fn change_passphrase(
        &self,
        key: &str,
        display_name: Option<&str>,
        new_passphrase: &str,
    ) -> Result<()> {
        self.store_passphrase(key, display_name, new_passphrase)
    }

    /// Whether a passphrase is stored under the given key
    ///
    /// Answers from the cached flag when one exists. Otherwise the backend is
    /// asked once and the answer seeds the flag; the seed query runs under the
    /// registry lock, so it cannot interleave with a concurrent mutation of
    /// the same key.
    pub fn is_passphrase_stored(&self, key: &str) -> Result<bool> {
        let flag = self.registry.try_get_or_create(key, || {
            let backend = self.resolve_backend()?;
            Ok(backend.exists(key))
        })?;
        Ok(flag.get())
    }

    /// Shared observable presence flag for the given key
    ///
    /// Repeated calls with the same key return the same instance, so every
    /// observer sees a single source of truth. A lazily created flag is
    /// seeded by asking the backend once; with no usable backend the flag
    /// starts out false.
    pub fn passphrase_stored_property(&self, key: &str) -> Arc<PresenceFlag> {
        if let Some(flag) = self.registry.get(key) {
            return flag;
        }

        let initial = match self.resolve_backend() {
            Ok(backend) => backend.exists(key),
            Err(e) => {
                warn!("Could not seed stored-passphrase flag for {}: {}", key, e);
                false
            }
        };
        self.registry.get_or_create(key, initial)
    }

    /// Resolve the backend active right now
    fn resolve_backend(&self) -> Result<Arc<dyn SecretBackend>> {
        self.selector
            .current()
            .ok_or(KeywardenError::NoBackendAvailable)
    }

    /// Record a confirmed mutation outcome and notify observers
    ///
    /// The flag entry is created on the spot if this key was never observed.
    /// The actual write runs on the notification context, so observers never
    /// see it from a foreign thread.
    fn set_stored(&self, key: &str, stored: bool) {
        let flag = self.registry.get_or_create(key, stored);
        self.notifier
            .schedule(Box::new(move || flag.set(stored)));
    }
}
