//! Vault lifecycle: the LOCKED / UNLOCKED state machine.
//!
//! ```text
//! LOCKED   --unlock(pw)--> UNLOCKED
//! UNLOCKED --lock()------> LOCKED
//! any      --reset()-----> LOCKED   (store destroyed)
//! ```
//!
//! The open `SecretStore` (and with it the master key) lives inside a
//! single mutex.  Every transition and every store operation goes
//! through that mutex, so a `lock()` waits for outstanding handles and
//! no handle outlives the session it was taken from.

use std::path::{Path, PathBuf};

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::crypto::kdf::{derive_master_key_with_params, KdfParams};
use crate::errors::{Result, VaultError};

use super::store::SecretStore;

/// Exclusive access to the open store.  Dropping it releases the vault
/// for the next caller.
pub type StoreHandle<'a> = MappedMutexGuard<'a, SecretStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Locked,
    Unlocked,
}

/// Owns the open/closed state of one secret store.
pub struct VaultManager {
    store_path: PathBuf,
    kdf: KdfParams,
    session: Mutex<Option<SecretStore>>,
}

impl VaultManager {
    /// A manager for the store at `store_path`.  Starts `Locked`.
    pub fn new(store_path: impl Into<PathBuf>, kdf: KdfParams) -> Self {
        Self {
            store_path: store_path.into(),
            kdf,
            session: Mutex::new(None),
        }
    }

    /// Derive the master key and open the store.
    ///
    /// A key that does not open the store is reported as
    /// `InvalidPassword` and nothing else.  Calling `unlock` on an
    /// unlocked vault succeeds only with the password already in use.
    pub fn unlock(&self, password: &[u8]) -> Result<()> {
        self.unlock_then(password, |_| Ok(()))
    }

    /// `unlock`, then run `on_unlocked` against the store before the
    /// vault mutex is released.
    ///
    /// If `on_unlocked` fails the session is closed again and its error
    /// returned, with an undecryptable store reported as `InvalidPassword`.
    pub fn unlock_then<F>(&self, password: &[u8], on_unlocked: F) -> Result<()>
    where
        F: FnOnce(&SecretStore) -> Result<()>,
    {
        let mut session = self.session.lock();
        let key = derive_master_key_with_params(password, &self.kdf)?;

        if session.is_none() {
            let store = SecretStore::open(&self.store_path, key).map_err(as_invalid_password)?;
            *session = Some(store);
            tracing::info!("vault unlocked");
        } else if !session.as_ref().is_some_and(|s| s.key_matches(&key)) {
            tracing::warn!("unlock rejected: vault already open under another key");
            return Err(VaultError::InvalidPassword);
        }

        let loaded = match session.as_ref() {
            Some(store) => on_unlocked(store),
            None => Err(VaultError::VaultLocked),
        };
        if let Err(e) = loaded {
            if let Some(store) = session.take() {
                if let Err(close_err) = store.close() {
                    tracing::warn!(error = %close_err, "failed to close store after load error");
                }
            }
            return Err(as_invalid_password(e));
        }
        Ok(())
    }

    /// Close the store and forget the key.  Data stays on disk.
    pub fn lock(&self) -> Result<()> {
        self.lock_then(|| {})
    }

    /// `lock`, running `on_locked` before the vault mutex is released.
    ///
    /// `on_locked` runs even if closing the connection fails; the vault
    /// is `Locked` either way.
    pub fn lock_then<F: FnOnce()>(&self, on_locked: F) -> Result<()> {
        let mut session = self.session.lock();
        let closed = match session.take() {
            Some(store) => {
                tracing::info!("vault locked");
                store.close()
            }
            None => Ok(()),
        };
        on_locked();
        closed
    }

    /// Close the store if open, then destroy it.  Always ends `Locked`.
    pub fn reset(&self) -> Result<()> {
        self.reset_then(|| {})
    }

    /// `reset`, running `on_locked` once the session is gone and before
    /// the vault mutex is released.
    pub fn reset_then<F: FnOnce()>(&self, on_locked: F) -> Result<()> {
        let mut session = self.session.lock();
        let closed = match session.take() {
            Some(store) => store.close(),
            None => Ok(()),
        };
        on_locked();
        SecretStore::destroy(&self.store_path)?;
        drop(session);

        tracing::info!("vault reset");
        closed
    }

    /// The open store, or `None` while locked.
    ///
    /// The handle holds the vault mutex: do not call other manager
    /// methods on this thread until it is dropped.
    pub fn handle(&self) -> Option<StoreHandle<'_>> {
        MutexGuard::try_map(self.session.lock(), Option::as_mut).ok()
    }

    pub fn state(&self) -> VaultState {
        if self.session.lock().is_some() {
            VaultState::Unlocked
        } else {
            VaultState::Locked
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == VaultState::Unlocked
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Whether a store file exists yet (i.e. a password was ever set).
    pub fn store_exists(&self) -> bool {
        self.store_path.exists()
    }
}

/// A store that does not decrypt under the derived key, whether the key
/// is wrong or the file is damaged, is reported as a bad password.
fn as_invalid_password(e: VaultError) -> VaultError {
    match e {
        VaultError::DecryptionFailed | VaultError::KeyDerivationFailed(_) => {
            tracing::warn!("unlock rejected: invalid password");
            VaultError::InvalidPassword
        }
        other => other,
    }
}
