use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{KdfParams, DEFAULT_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::vault::DEFAULT_USERNAME;

/// Project-level configuration, loaded from `.hostvault.toml`.
///
/// Every field has a sensible default so HostVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the vault database.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// File name of the vault database inside `vault_dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// PBKDF2 iteration count (default: 1 000 000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Username stored when a save request names none (default: root).
    #[serde(default = "default_username")]
    pub default_username: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".hostvault".to_string()
}

fn default_database_file() -> String {
    "vault.db".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            database_file: default_database_file(),
            kdf_iterations: default_kdf_iterations(),
            default_username: default_username(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".hostvault.toml";

    /// Load settings from `<project_dir>/.hostvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "settings loaded");
        Ok(settings)
    }

    /// Full path to the vault database.
    ///
    /// Example: `project_dir/.hostvault/vault.db`
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir).join(&self.database_file)
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.kdf_iterations,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
