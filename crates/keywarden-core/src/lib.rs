//! # keywarden-core
//!
//! Core credential management for Keywarden including:
//! - OS keychain mediation behind a pluggable backend capability
//! - Passphrase CRUD with zeroize-on-drop secret handling
//! - Reactive per-key presence flags with cross-thread notification
//! - Vault settings persistence
//!
//! The [`CredentialManager`] facade resolves the active [`SecretBackend`]
//! through a [`BackendSelector`] on every call, so backends can be swapped at
//! runtime. Presence flags are observable from any thread; their writes are
//! marshaled onto one [`NotificationContext`].

pub mod backend;
pub mod credential;
pub mod error;
pub mod notify;
pub mod presence;
pub mod settings;

pub use backend::{BackendSelector, KeychainBackend, MemoryBackend, SecretBackend};
pub use credential::{CredentialManager, Passphrase};
pub use error::{KeywardenError, Result};
pub use notify::{DispatchThread, Job, NotificationContext, QueuedContext};
pub use presence::{PresenceFlag, PresenceRegistry, SubscriptionId};
pub use settings::{Settings, SettingsManager, VaultSettings, WhenUnlocked};
