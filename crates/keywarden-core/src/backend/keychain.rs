//! OS keychain backend
//!
//! Uses the system keychain for secret storage:
//! - macOS: Keychain
//! - Windows: Credential Manager (DPAPI)
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::SecretBackend;
use crate::credential::Passphrase;
use crate::error::{KeywardenError, Result};

/// Service name used for keychain entries
const SERVICE_NAME: &str = "keywarden";

/// OS keychain backend
pub struct KeychainBackend {
    /// Service namespace for all entries
    service: String,
}

impl KeychainBackend {
    /// Create a new keychain backend using the default service namespace
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Create a keychain backend with a custom service namespace
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    /// Detect whether the system keychain is usable, returning a backend if so
    ///
    /// Probes by writing and deleting a throwaway entry. Returns `None` on
    /// headless systems or when no secret service daemon is running; callers
    /// feed the result into a [`BackendSelector`](super::BackendSelector).
    pub fn detect() -> Option<Self> {
        let backend = Self::new();
        if backend.probe() {
            debug!("System keychain is available");
            Some(backend)
        } else {
            warn!("System keychain is not available");
            None
        }
    }

    /// Test whether the keychain accepts a write
    fn probe(&self) -> bool {
        match Entry::new(&self.service, "__probe__") {
            Ok(entry) => {
                if entry.set_password("probe").is_ok() {
                    let _ = entry.delete_password();
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    }

    /// Get a keyring entry for a key
    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(|e| KeywardenError::BackendAccess(e.to_string()))
    }

    /// Name of the native store behind this backend
    pub fn store_name() -> &'static str {
        #[cfg(target_os = "macos")]
        return "macOS Keychain";

        #[cfg(target_os = "windows")]
        return "Windows Credential Manager";

        #[cfg(target_os = "linux")]
        return "Linux Secret Service";

        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        return "System Keychain";
    }
}

impl Default for KeychainBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretBackend for KeychainBackend {
    fn store(&self, key: &str, _display_name: Option<&str>, passphrase: &str) -> Result<()> {
        // The keyring facade derives its own entry label from service and
        // key; the advisory display name has nowhere to go here.
        let entry = self.entry(key)?;

        entry
            .set_password(passphrase)
            .map_err(|e| KeywardenError::BackendAccess(e.to_string()))?;

        debug!("Stored passphrase in {}: {}", Self::store_name(), key);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Passphrase>> {
        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(value) => {
                debug!("Loaded passphrase from {}: {}", Self::store_name(), key);
                Ok(Some(Passphrase::new(value)))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No passphrase stored for key: {}", key);
                Ok(None)
            }
            Err(e) => Err(KeywardenError::BackendAccess(e.to_string())),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let entry = self.entry(key)?;

        match entry.delete_password() {
            Ok(()) => {
                debug!("Deleted passphrase from {}: {}", Self::store_name(), key);
                Ok(())
            }
            // Key doesn't exist, that's fine
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeywardenError::BackendAccess(e.to_string())),
        }
    }

    fn exists(&self, key: &str) -> bool {
        // The keyring facade has no metadata-only query, so this fetches the
        // value and zeroizes it immediately.
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Keychain presence query failed for {}: {}", key, e);
                return false;
            }
        };

        match entry.get_password() {
            Ok(mut value) => {
                value.zeroize();
                true
            }
            Err(keyring::Error::NoEntry) => false,
            Err(e) => {
                warn!("Keychain presence query failed for {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_does_not_panic() {
        // Headless CI has no secret service; detection must degrade to None
        // rather than panic.
        let _ = KeychainBackend::detect();
    }

    #[test]
    fn test_store_name_is_nonempty() {
        assert!(!KeychainBackend::store_name().is_empty());
    }
}
