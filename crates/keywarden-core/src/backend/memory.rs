//! In-memory reference backend
//!
//! Keeps secrets in a process-local map. Serves as the reference
//! implementation of the backend contract and as the test double everywhere a
//! real keychain would get in the way.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::SecretBackend;
use crate::credential::Passphrase;
use crate::error::Result;

/// One stored secret plus its advisory label
struct StoredEntry {
    display_name: Option<String>,
    passphrase: Passphrase,
}

/// In-memory secret store
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Display name recorded for a key, if any
    pub fn display_name(&self, key: &str) -> Option<String> {
        self.lock()
            .get(key)
            .and_then(|entry| entry.display_name.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecretBackend for MemoryBackend {
    fn store(&self, key: &str, display_name: Option<&str>, passphrase: &str) -> Result<()> {
        self.lock().insert(
            key.to_string(),
            StoredEntry {
                display_name: display_name.map(str::to_string),
                passphrase: Passphrase::from(passphrase),
            },
        );
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Passphrase>> {
        Ok(self.lock().get(key).map(|entry| entry.passphrase.clone()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}
