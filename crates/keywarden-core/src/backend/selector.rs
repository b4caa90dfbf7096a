//! Runtime-swappable backend handle

use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use super::SecretBackend;

/// Shared handle to the currently active secret store backend, if any
///
/// The application wires one selector into the credential manager at startup
/// and may replace the backend at any time, e.g. after probing which native
/// stores are usable. Operations resolve the backend per call: an operation
/// that cloned the `Arc` before a replacement completes against the backend it
/// captured, and a later call sees the new one.
#[derive(Clone, Default)]
pub struct BackendSelector {
    inner: Arc<RwLock<Option<Arc<dyn SecretBackend>>>>,
}

impl BackendSelector {
    /// Create a selector with no active backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selector with the given backend already active
    pub fn with_backend(backend: Arc<dyn SecretBackend>) -> Self {
        let selector = Self::new();
        selector.replace(Some(backend));
        selector
    }

    /// The currently active backend, or `None` if no store is configured
    pub fn current(&self) -> Option<Arc<dyn SecretBackend>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any backend is currently active
    pub fn is_available(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Swap the active backend, `None` meaning "no usable store"
    pub fn replace(&self, backend: Option<Arc<dyn SecretBackend>>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match backend {
            Some(_) => info!("Secret store backend activated"),
            None => info!("Secret store backend cleared"),
        }
        *guard = backend;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[test]
    fn test_empty_selector() {
        let selector = BackendSelector::new();
        assert!(!selector.is_available());
        assert!(selector.current().is_none());
    }

    #[test]
    fn test_replace_and_clear() {
        let selector = BackendSelector::new();
        selector.replace(Some(Arc::new(MemoryBackend::new())));
        assert!(selector.is_available());

        selector.replace(None);
        assert!(!selector.is_available());
    }

    #[test]
    fn test_captured_reference_survives_replacement() {
        let selector = BackendSelector::with_backend(Arc::new(MemoryBackend::new()));
        let captured = selector.current().unwrap();

        selector.replace(Some(Arc::new(MemoryBackend::new())));

        // The captured backend still works in isolation
        captured.store("vault", None, "secret").unwrap();
        assert!(captured.exists("vault"));

        // But the selector now resolves to the replacement
        assert!(!selector.current().unwrap().exists("vault"));
    }
}
