//! AES-256-GCM sealing with associated data.
//!
//! Sealed layout: `[ 12-byte nonce | ciphertext + 16-byte tag ]`.
//!
//! The associated data is authenticated but not stored.  The caller must
//! present the same bytes to `decrypt`, which is how a sealed value is
//! pinned to the row and index entry it was written for.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{Result, VaultError};

const NONCE_LEN: usize = 12;

fn cipher(key: &[u8]) -> Option<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).ok()
}

/// Seal `plaintext` under a 32-byte `key`, binding it to `aad`.
pub fn encrypt(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher(key)
        .ok_or_else(|| VaultError::EncryptionFailed(format!("key must be 32 bytes, got {}", key.len())))?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;

    let mut out = nonce.to_vec();
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Open a value produced by `encrypt` with the same `key` and `aad`.
///
/// Short input, a wrong key, wrong associated data and a bad tag all
/// come back as the same `DecryptionFailed`.
pub fn decrypt(key: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(VaultError::DecryptionFailed);
    }
    let (nonce, msg) = sealed.split_at(NONCE_LEN);

    cipher(key)
        .ok_or(VaultError::DecryptionFailed)?
        .decrypt(Nonce::from_slice(nonce), Payload { msg, aad })
        .map_err(|_| VaultError::DecryptionFailed)
}
