//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The salt is a fixed application-wide constant, so the same password
//! always yields the same master key on every machine.  The iteration
//! count is configurable via `KdfParams` (loaded from `.hostvault.toml`
//! or the default of one million rounds).

use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Application-wide PBKDF2 salt.
pub const APP_SALT: &[u8] = b"hostvault.credential-vault.v1";

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 1_000_000;

/// Lowest iteration count accepted, to catch a zeroed or truncated config.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Configurable PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Number of HMAC-SHA256 rounds (default: 1 000 000).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derive a 32-byte master key from a password with the default parameters.
///
/// Prefer `derive_master_key_with_params` when you have a `Settings`.
pub fn derive_master_key(password: &[u8]) -> Result<MasterKey> {
    derive_master_key_with_params(password, &KdfParams::default())
}

/// Derive a 32-byte master key with explicit PBKDF2 parameters.
///
/// An empty password is accepted; it simply produces a key that will not
/// open a vault sealed under any other password.
pub fn derive_master_key_with_params(password: &[u8], params: &KdfParams) -> Result<MasterKey> {
    if params.iterations < MIN_ITERATIONS {
        return Err(VaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, APP_SALT, params.iterations, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))?;

    let master = MasterKey::new(key);
    key.zeroize();
    Ok(master)
}
