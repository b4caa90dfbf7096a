//! Application settings management
//!
//! Stores non-sensitive vault configuration in a plain JSON file. Secret
//! material never lands here; it belongs to the secret store backends.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{KeywardenError, Result};

/// What to do with a vault right after it was unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WhenUnlocked {
    /// Ask the user each time
    #[default]
    Ask,
    /// Reveal the mounted volume
    Reveal,
    /// Do nothing
    Ignore,
}

/// Per-vault configuration record
///
/// Identity lives in `id` alone: two records with the same id describe the
/// same vault regardless of how the rest of the fields diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSettings {
    /// Stable vault identifier, also used as the credential key
    pub id: String,
    /// Filesystem location of the vault
    pub path: Option<PathBuf>,
    /// Human-readable vault name
    pub display_name: Option<String>,
    /// Unlock this vault when the application starts
    pub unlock_after_startup: bool,
    /// Reveal the volume after mounting
    pub reveal_after_mount: bool,
    /// Mount read-only
    pub uses_read_only_mode: bool,
    /// Extra flags handed to the mounter
    pub mount_flags: Option<String>,
    /// Cleartext filename length limit, `None` meaning unlimited
    pub max_cleartext_filename_length: Option<u32>,
    /// Action after a successful unlock
    pub action_after_unlock: WhenUnlocked,
    /// Lock the vault automatically when idle
    pub auto_lock_when_idle: bool,
    /// Idle seconds before an automatic lock
    pub auto_lock_idle_seconds: u32,
    /// Preferred mount point
    pub mount_point: Option<PathBuf>,
    /// Mount service implementation to use
    pub mount_service: Option<String>,
    /// Loopback port for the volume server
    pub port: u16,
}

impl VaultSettings {
    /// Default loopback port for the volume server
    pub const DEFAULT_PORT: u16 = 42427;

    /// Create settings for a vault with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            display_name: None,
            unlock_after_startup: false,
            reveal_after_mount: true,
            uses_read_only_mode: false,
            mount_flags: None,
            max_cleartext_filename_length: None,
            action_after_unlock: WhenUnlocked::default(),
            auto_lock_when_idle: false,
            auto_lock_idle_seconds: 15 * 60,
            mount_point: None,
            mount_service: None,
            port: Self::DEFAULT_PORT,
        }
    }

    /// Create settings for a new vault with a freshly generated id
    pub fn with_random_id() -> Self {
        Self::new(Uuid::new_v4().simple().to_string())
    }

    /// Sanitize a user-chosen display name into something every filesystem
    /// and native keychain UI accepts
    ///
    /// Blank input and the dot directories collapse to `"_"`; other
    /// whitespace becomes a plain space; control characters and
    /// filename-reserved punctuation become `_`.
    pub fn normalize_display_name(original: &str) -> String {
        let trimmed = original.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
            return "_".to_string();
        }

        trimmed
            .chars()
            .map(|c| {
                if c.is_whitespace() {
                    ' '
                } else if c.is_control()
                    || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
                {
                    '_'
                } else {
                    c
                }
            })
            .collect()
    }
}

impl PartialEq for VaultSettings {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VaultSettings {}

impl std::hash::Hash for VaultSettings {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Name of the preferred secret store backend, `None` meaning auto-detect
    pub keychain_provider: Option<String>,
    /// Known vaults
    pub vaults: Vec<VaultSettings>,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: 1,
            keychain_provider: None,
            vaults: Vec::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a new settings manager reading from the given directory
    pub fn new(storage_dir: &Path) -> Self {
        let settings_file = storage_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_default();

        Self {
            settings_file,
            settings,
        }
    }

    /// Default settings directory for this platform
    pub fn default_dir() -> Result<PathBuf> {
        directories::ProjectDirs::from("org", "keywarden", "keywarden")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                KeywardenError::Storage("could not determine data directory".to_string())
            })
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Update settings and save
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save().await
    }

    /// Settings record for one vault, if known
    pub fn vault(&self, id: &str) -> Option<&VaultSettings> {
        self.settings.vaults.iter().find(|v| v.id == id)
    }

    /// Insert or replace one vault record and save
    pub async fn upsert_vault(&mut self, vault: VaultSettings) -> Result<()> {
        match self.settings.vaults.iter().position(|v| v.id == vault.id) {
            Some(index) => self.settings.vaults[index] = vault,
            None => self.settings.vaults.push(vault),
        }
        self.save().await
    }

    /// Remove one vault record and save
    pub async fn remove_vault(&mut self, id: &str) -> Result<()> {
        self.settings.vaults.retain(|v| v.id != id);
        self.save().await
    }
}
