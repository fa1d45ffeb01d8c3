//! The vault context: one value, owned by the application root, that
//! holds the lifecycle manager and the session cache for a single vault.
//!
//! Share it behind an `Arc` when several threads need credentials.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::crypto::KdfParams;
use crate::session::{CredentialCache, CredentialService};
use crate::vault::{VaultManager, DEFAULT_USERNAME};

pub struct VaultContext {
    manager: VaultManager,
    cache: CredentialCache,
    default_username: String,
}

impl VaultContext {
    /// A context for the store at `store_path`.  Starts locked with an
    /// empty cache.
    pub fn new(store_path: impl Into<PathBuf>, kdf: KdfParams) -> Self {
        Self {
            manager: VaultManager::new(store_path, kdf),
            cache: CredentialCache::new(),
            default_username: DEFAULT_USERNAME.to_string(),
        }
    }

    /// Build a context from project settings.
    pub fn from_settings(settings: &Settings, project_dir: &Path) -> Self {
        let mut ctx = Self::new(settings.store_path(project_dir), settings.kdf_params());
        ctx.default_username = settings.default_username.clone();
        ctx
    }

    /// The credential operations for this vault.
    pub fn credentials(&self) -> CredentialService<'_> {
        CredentialService::new(self)
    }

    pub fn manager(&self) -> &VaultManager {
        &self.manager
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    pub fn default_username(&self) -> &str {
        &self.default_username
    }
}
