//! Credential access: the operations the rest of the application calls.
//!
//! Reads are served from the session cache.  Durable writes go through
//! the vault manager, and the cache is rebuilt from the store afterwards
//! so the store stays the source of truth.

use std::collections::BTreeSet;
use std::path::Path;

use crate::context::VaultContext;
use crate::errors::{Result, VaultError};
use crate::vault::{SecretContent, SecretRecord, VaultState};

use super::credential::{CredentialKind, CredentialValue, Keyfile};

/// A request to persist one credential.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub hostname: String,
    /// `password` or `keyfile`; validated on save.
    pub kind: String,
    pub value: CredentialValue,
    /// Falls back to the configured default username.
    pub username: Option<String>,
    /// Display label.  Falls back to the key file name for key files.
    pub reference: Option<String>,
}

impl SaveRequest {
    pub fn new(hostname: &str, kind: &str, value: CredentialValue) -> Self {
        Self {
            hostname: hostname.to_string(),
            kind: kind.to_string(),
            value,
            username: None,
            reference: None,
        }
    }

    pub fn password(hostname: &str, password: &str) -> Self {
        Self::new(
            hostname,
            CredentialKind::Password.as_str(),
            CredentialValue::Password(password.to_string()),
        )
    }

    pub fn keyfile(hostname: &str, keyfile: Keyfile) -> Self {
        Self::new(
            hostname,
            CredentialKind::Keyfile.as_str(),
            CredentialValue::Keyfile(keyfile),
        )
    }

    /// Read a key file from disk, keeping its file name as the label.
    pub fn keyfile_from_path(hostname: &str, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::keyfile(hostname, Keyfile::new(name, contents)))
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }
}

/// Credential operations bound to one `VaultContext`.
pub struct CredentialService<'a> {
    ctx: &'a VaultContext,
}

impl<'a> CredentialService<'a> {
    pub fn new(ctx: &'a VaultContext) -> Self {
        Self { ctx }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Unlock the vault and load every record into the session cache.
    ///
    /// The cache is filled before the vault mutex is released, so a
    /// concurrent `lock` either runs first or clears what was loaded.
    pub fn unlock(&self, password: &str) -> Result<()> {
        let cache = self.ctx.cache();
        self.ctx
            .manager()
            .unlock_then(password.as_bytes(), |store| {
                cache.rebuild(&store.list()?);
                Ok(())
            })
    }

    /// Lock the vault and empty the session cache.
    pub fn lock(&self) -> Result<()> {
        let cache = self.ctx.cache();
        self.ctx.manager().lock_then(|| cache.clear(None, None))
    }

    /// Destroy the vault and empty the session cache.
    pub fn reset(&self) -> Result<()> {
        let cache = self.ctx.cache();
        self.ctx.manager().reset_then(|| cache.clear(None, None))
    }

    pub fn state(&self) -> VaultState {
        self.ctx.manager().state()
    }

    // ------------------------------------------------------------------
    // Session-only operations
    // ------------------------------------------------------------------

    /// The cached credential of `kind` for `hostname`.
    pub fn retrieve(&self, hostname: &str, kind: &str) -> Result<Option<CredentialValue>> {
        let kind: CredentialKind = kind.parse()?;
        Ok(self.ctx.cache().get(hostname, kind))
    }

    /// Keep a credential for this session only.  The vault must be
    /// unlocked; the value is dropped on the next lock or reload.
    pub fn store_in_session(&self, hostname: &str, kind: &str, value: CredentialValue) -> Result<()> {
        let kind: CredentialKind = kind.parse()?;
        ensure_value_matches(kind, &value)?;

        let _held = self.ctx.manager().handle().ok_or(VaultError::VaultLocked)?;
        self.ctx.cache().put(hostname, &value);
        Ok(())
    }

    /// Forget cached credentials for `hostname`.  Persisted records are
    /// untouched; use `delete_from_vault` for that.
    pub fn clear_stored_credentials(&self, hostname: &str, kind: Option<&str>) -> Result<()> {
        let kind = kind.map(str::parse::<CredentialKind>).transpose()?;
        self.ctx.cache().clear(Some(hostname), kind);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Vault operations
    // ------------------------------------------------------------------

    /// Persist a credential, updating the existing record for the same
    /// host and kind.  Returns the record id.
    pub fn save_to_vault(&self, request: &SaveRequest) -> Result<String> {
        let kind: CredentialKind = request.kind.parse()?;
        ensure_value_matches(kind, &request.value)?;

        let mut handle = self.ctx.manager().handle().ok_or(VaultError::VaultLocked)?;

        let username = request
            .username
            .as_deref()
            .unwrap_or(self.ctx.default_username());
        let content = match &request.value {
            CredentialValue::Password(password) => {
                let mut content = SecretContent::password(&request.hostname, username, password);
                content.reference = request.reference.clone().unwrap_or_default();
                content
            }
            CredentialValue::Keyfile(keyfile) => {
                let label = request.reference.as_deref().unwrap_or(&keyfile.name);
                SecretContent::key(&request.hostname, username, label, &keyfile.contents)
            }
        };

        let id = match handle.find(&request.hostname, kind.secret_type())? {
            Some(existing) => {
                handle.update(&existing.id, &content)?;
                existing.id.clone()
            }
            None => handle.add(&content)?,
        };

        self.ctx.cache().rebuild(&handle.list()?);
        drop(handle);

        tracing::info!(id = %id, kind = %kind, "credential saved to vault");
        Ok(id)
    }

    /// Delete the persisted record for `hostname` and `kind`.
    ///
    /// Returns `false` when there was nothing to delete.
    pub fn delete_from_vault(&self, hostname: &str, kind: &str) -> Result<bool> {
        let kind: CredentialKind = kind.parse()?;
        let mut handle = self.ctx.manager().handle().ok_or(VaultError::VaultLocked)?;

        let Some(existing) = handle.find(hostname, kind.secret_type())? else {
            return Ok(false);
        };
        handle.delete(&existing.id)?;

        self.ctx.cache().rebuild(&handle.list()?);
        drop(handle);

        tracing::info!(id = %existing.id, kind = %kind, "credential deleted from vault");
        Ok(true)
    }

    /// Replace the tags on the record for `hostname` and `kind`.
    pub fn tag(&self, hostname: &str, kind: &str, tags: BTreeSet<String>) -> Result<()> {
        let kind: CredentialKind = kind.parse()?;
        let mut handle = self.ctx.manager().handle().ok_or(VaultError::VaultLocked)?;

        let existing = handle
            .find(hostname, kind.secret_type())?
            .ok_or_else(|| VaultError::RecordNotFound(format!("{hostname}/{kind}")))?;
        handle.set_tags(&existing.id, &tags)
    }

    /// Every persisted record, decrypted.
    pub fn records(&self) -> Result<Vec<SecretRecord>> {
        let handle = self.ctx.manager().handle().ok_or(VaultError::VaultLocked)?;
        handle.list()
    }
}

fn ensure_value_matches(kind: CredentialKind, value: &CredentialValue) -> Result<()> {
    if value.kind() == kind {
        Ok(())
    } else {
        Err(VaultError::InvalidCredentialType(format!(
            "{kind} (value is a {})",
            value.kind()
        )))
    }
}
