//! Sub-key derivation helpers using HKDF-SHA256.
//!
//! From a single master key we derive:
//! - A unique **per-record** encryption key for each record id.
//! - An **index key** for the keyed `(hostname, type)` lookup column.
//! - A **verifier key** used to check the password when the store opens.

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of the master key and of every derived sub-key (256 bits).
pub const KEY_LEN: usize = 32;

/// Derive a per-record encryption key from the master key.
///
/// Binding the key to the record id means an encrypted `content` blob
/// copied onto another row no longer decrypts.
pub fn derive_record_key(master_key: &[u8], record_id: &str) -> Result<[u8; KEY_LEN]> {
    let info = format!("hostvault-record:{record_id}");
    hkdf_derive(master_key, info.as_bytes())
}

/// Derive the HMAC key for the `(hostname, type)` blind index.
pub fn derive_index_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"hostvault-index-key")
}

/// Derive the key that seals the store's password verifier.
pub fn derive_verifier_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"hostvault-verifier-key")
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The extract step is skipped because the master key already came out
/// of PBKDF2 with full entropy.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that zeroes its memory when dropped.
///
/// Lives only as long as an unlocked session; never written to disk.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Constant-time equality against another key.
    pub fn matches(&self, other: &MasterKey) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }

    pub fn derive_record_key(&self, record_id: &str) -> Result<[u8; KEY_LEN]> {
        derive_record_key(&self.bytes, record_id)
    }

    pub fn derive_index_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_index_key(&self.bytes)
    }

    pub fn derive_verifier_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_verifier_key(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keys_differ_per_id() {
        let master = MasterKey::new([7u8; KEY_LEN]);
        let a = master.derive_record_key("a").unwrap();
        let b = master.derive_record_key("b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sub_keys_are_independent() {
        let master = MasterKey::new([7u8; KEY_LEN]);
        assert_ne!(
            master.derive_index_key().unwrap(),
            master.derive_verifier_key().unwrap()
        );
    }

    #[test]
    fn matches_compares_bytes() {
        let a = MasterKey::new([1u8; KEY_LEN]);
        let b = MasterKey::new([1u8; KEY_LEN]);
        let c = MasterKey::new([2u8; KEY_LEN]);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }
}
