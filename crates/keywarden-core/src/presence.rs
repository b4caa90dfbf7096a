//! Per-key presence flags and their registry
//!
//! A [`PresenceFlag`] is the observable "is a secret stored for this key"
//! signal handed to UI layers. Flags are created lazily by the
//! [`PresenceRegistry`] and live for the registry's lifetime; deleting a
//! secret flips the flag to false but never drops the entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;

/// Handle identifying one subscription on a [`PresenceFlag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(bool) + Send + Sync>;

/// Observable boolean presence signal for one credential key
///
/// Reads are lock-free and safe from any thread. Writes happen only through
/// work scheduled on the notification context, so subscribers always see
/// changes from the one designated thread, in order.
pub struct PresenceFlag {
    stored: AtomicBool,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_id: AtomicU64,
}

impl PresenceFlag {
    fn new(initial: bool) -> Self {
        Self {
            stored: AtomicBool::new(initial),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Current value of the flag
    pub fn get(&self) -> bool {
        self.stored.load(Ordering::Acquire)
    }

    /// Register a callback invoked on the notification thread whenever the
    /// value actually changes
    pub fn subscribe(&self, callback: impl Fn(bool) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription, returning whether it was still registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Update the value, notifying subscribers on actual change only
    ///
    /// Must run on the notification context; see the manager's marshaling.
    pub(crate) fn set(&self, value: bool) {
        let previous = self.stored.swap(value, Ordering::AcqRel);
        if previous == value {
            return;
        }

        // Snapshot the callbacks so none of them can deadlock against the
        // subscriber list by subscribing or unsubscribing from within.
        let snapshot: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }
}

/// Registry mapping credential keys to their shared presence flags
///
/// Entries are created on demand and never evicted; growth is bounded by the
/// number of distinct keys a process touches. The map lock is held only
/// around lookup and creation - once a caller holds an `Arc<PresenceFlag>`,
/// reads on it never contend with the registry.
#[derive(Default)]
pub struct PresenceRegistry {
    entries: Mutex<HashMap<String, Arc<PresenceFlag>>>,
}

impl PresenceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing flag for a key, if one was ever created
    pub fn get(&self, key: &str) -> Option<Arc<PresenceFlag>> {
        self.lock().get(key).cloned()
    }

    /// Flag for a key, created with the given initial value if absent
    ///
    /// Concurrent calls for the same key converge on one entry.
    pub fn get_or_create(&self, key: &str, initial: bool) -> Arc<PresenceFlag> {
        let mut entries = self.lock();
        entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(PresenceFlag::new(initial)))
            .clone()
    }

    /// Flag for a key, created from a fallible seed query if absent
    ///
    /// The seed runs under the registry lock, so a concurrent mutation of the
    /// same key cannot interleave between the query and the insert. A seed
    /// failure creates no entry.
    pub fn try_get_or_create(
        &self,
        key: &str,
        seed: impl FnOnce() -> Result<bool>,
    ) -> Result<Arc<PresenceFlag>> {
        let mut entries = self.lock();
        if let Some(flag) = entries.get(key) {
            return Ok(flag.clone());
        }

        let initial = seed()?;
        let flag = Arc::new(PresenceFlag::new(initial));
        entries.insert(key.to_string(), flag.clone());
        Ok(flag)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<PresenceFlag>>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeywardenError;

    #[test]
    fn test_get_or_create_returns_shared_instance() {
        let registry = PresenceRegistry::new();
        let first = registry.get_or_create("vault", false);
        let second = registry.get_or_create("vault", true);

        assert!(Arc::ptr_eq(&first, &second));
        // Second call did not reinitialize the existing entry
        assert!(!second.get());
    }

    #[test]
    fn test_concurrent_creation_converges() {
        let registry = Arc::new(PresenceRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get_or_create("vault", false))
            })
            .collect();

        let flags: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for flag in &flags[1..] {
            assert!(Arc::ptr_eq(&flags[0], flag));
        }
    }

    #[test]
    fn test_seed_failure_creates_no_entry() {
        let registry = PresenceRegistry::new();
        let result = registry.try_get_or_create("vault", || {
            Err(KeywardenError::BackendAccess("store locked".to_string()))
        });

        assert!(result.is_err());
        assert!(registry.get("vault").is_none());

        // A later successful seed still works
        let flag = registry.try_get_or_create("vault", || Ok(true)).unwrap();
        assert!(flag.get());
    }

    #[test]
    fn test_seed_skipped_for_existing_entry() {
        let registry = PresenceRegistry::new();
        registry.get_or_create("vault", true);

        let flag = registry
            .try_get_or_create("vault", || panic!("seed must not run"))
            .unwrap();
        assert!(flag.get());
    }

    #[test]
    fn test_subscribers_notified_on_change_only() {
        let flag = PresenceFlag::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_cb = seen.clone();
        flag.subscribe(move |value| seen_cb.lock().unwrap().push(value));

        flag.set(false); // no change, no notification
        flag.set(true);
        flag.set(true); // no change
        flag.set(false);

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let flag = PresenceFlag::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_cb = seen.clone();
        let id = flag.subscribe(move |value| seen_cb.lock().unwrap().push(value));

        flag.set(true);
        assert!(flag.unsubscribe(id));
        assert!(!flag.unsubscribe(id));
        flag.set(false);

        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }
}
