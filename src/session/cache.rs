//! In-memory session cache of decrypted credentials, keyed by hostname.
//!
//! The map sits behind an `Arc` that writers replace (rebuild) or
//! copy-on-write (put/clear).  Readers clone the `Arc` and work on a
//! snapshot, so they never see a half-built map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::credential::{CredentialCacheEntry, CredentialKind, CredentialValue, Keyfile};
use crate::vault::{SecretRecord, SecretType};

type CacheMap = HashMap<String, CredentialCacheEntry>;

#[derive(Default)]
pub struct CredentialCache {
    entries: RwLock<Arc<CacheMap>>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with the contents of `records`.
    ///
    /// Duplicate `(hostname, type)` records are tolerated; the last one wins.
    pub fn rebuild(&self, records: &[SecretRecord]) {
        let mut map = CacheMap::new();

        for record in records {
            let content = &record.content;
            let entry = map.entry(content.hostname.clone()).or_default();
            match content.kind {
                SecretType::Password => {
                    entry.password = Some(content.credential.clone());
                }
                SecretType::Key => {
                    entry.keyfile = Some(Keyfile::new(
                        content.reference.clone(),
                        content.credential.clone(),
                    ));
                }
            }
            entry.username = Some(content.username.clone());
        }

        let hosts = map.len();
        *self.entries.write() = Arc::new(map);
        tracing::debug!(hosts, "credential cache rebuilt");
    }

    /// The cached credential of `kind` for `hostname`, if any.
    pub fn get(&self, hostname: &str, kind: CredentialKind) -> Option<CredentialValue> {
        let snapshot = self.snapshot();
        let entry = snapshot.get(hostname)?;
        match kind {
            CredentialKind::Password => entry.password.clone().map(CredentialValue::Password),
            CredentialKind::Keyfile => entry.keyfile.clone().map(CredentialValue::Keyfile),
        }
    }

    /// The cached username for `hostname`, if any.
    pub fn username(&self, hostname: &str) -> Option<String> {
        self.snapshot().get(hostname)?.username.clone()
    }

    /// Store a session-only credential.  Never touches the vault.
    pub fn put(&self, hostname: &str, value: &CredentialValue) {
        let mut guard = self.entries.write();
        let map = Arc::make_mut(&mut *guard);
        let entry = map.entry(hostname.to_string()).or_default();
        match value {
            CredentialValue::Password(p) => entry.password = Some(p.clone()),
            CredentialValue::Keyfile(k) => entry.keyfile = Some(k.clone()),
        }
    }

    /// Drop cached credentials.
    ///
    /// | hostname | kind  | clears                         |
    /// |----------|-------|--------------------------------|
    /// | `Some`   | `Some`| that kind for that host        |
    /// | `Some`   | `None`| everything for that host       |
    /// | `None`   | `Some`| that kind for every host       |
    /// | `None`   | `None`| the whole cache                |
    pub fn clear(&self, hostname: Option<&str>, kind: Option<CredentialKind>) {
        let mut guard = self.entries.write();

        match (hostname, kind) {
            (None, None) => {
                *guard = Arc::new(CacheMap::new());
            }
            (Some(host), None) => {
                Arc::make_mut(&mut *guard).remove(host);
            }
            (Some(host), Some(kind)) => {
                let map = Arc::make_mut(&mut *guard);
                if let Some(entry) = map.get_mut(host) {
                    clear_kind(entry, kind);
                    if entry.has_no_credentials() {
                        map.remove(host);
                    }
                }
            }
            (None, Some(kind)) => {
                let map = Arc::make_mut(&mut *guard);
                for entry in map.values_mut() {
                    clear_kind(entry, kind);
                }
                map.retain(|_, entry| !entry.has_no_credentials());
            }
        }
    }

    /// A consistent view of the cache at this instant.
    pub fn snapshot(&self) -> Arc<HashMap<String, CredentialCacheEntry>> {
        self.entries.read().clone()
    }

    /// Cached hostnames, sorted.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.snapshot().keys().cloned().collect();
        hosts.sort();
        hosts
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn clear_kind(entry: &mut CredentialCacheEntry, kind: CredentialKind) {
    match kind {
        CredentialKind::Password => entry.password = None,
        CredentialKind::Keyfile => entry.keyfile = None,
    }
}
