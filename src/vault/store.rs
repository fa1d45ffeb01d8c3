//! SQLite-backed encrypted secret store.
//!
//! One database file holds two tables:
//!
//! ```text
//! vault_meta(name TEXT PRIMARY KEY, value BLOB)
//! secrets(id TEXT PRIMARY KEY, lookup BLOB UNIQUE, content BLOB, date TEXT, tags TEXT)
//! ```
//!
//! - `content` is the JSON `SecretContent`, sealed with AES-256-GCM under
//!   a key derived from the master key and the record id.  The associated
//!   data is `id || lookup`, so a row's ciphertext only opens under its
//!   own id and its own index entry.
//! - `lookup` is `HMAC-SHA256(index_key, hostname 0x00 TYPE)`.  It lets us
//!   find the record for a `(hostname, type)` pair without decrypting
//!   anything, and its `UNIQUE` constraint keeps that pair canonical.
//! - `vault_meta.verifier` is a sealed constant.  Opening with the wrong
//!   key fails on it before any record is read or written.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::keys::MasterKey;
use crate::errors::{Result, VaultError};

use super::secret::{SecretContent, SecretRecord, SecretType};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vault_meta (
    name  TEXT PRIMARY KEY,
    value BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS secrets (
    id      TEXT PRIMARY KEY,
    lookup  BLOB NOT NULL UNIQUE,
    content BLOB NOT NULL,
    date    TEXT NOT NULL,
    tags    TEXT NOT NULL DEFAULT '[]'
);";

const ROW_COLUMNS: &str = "id, lookup, content, date, tags";

const VERIFIER_NAME: &str = "verifier";
const VERIFIER_PLAINTEXT: &[u8] = b"hostvault-verifier-v1";

/// Suffixes SQLite may create next to the main database file.
const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// An open secret store.  Holds the master key for as long as it is open.
pub struct SecretStore {
    conn: Connection,
    path: PathBuf,
    master_key: MasterKey,
}

impl SecretStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the store at `path`, creating it if absent.
    ///
    /// Fails with `DecryptionFailed` when `master_key` is not the key the
    /// store was sealed with, or when the file is not a readable store at
    /// all; nothing is written in either case.  Environment faults
    /// (permissions, full disk, a busy database) keep their own error.
    pub fn open(path: &Path, master_key: MasterKey) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        conn.execute_batch(SCHEMA).map_err(open_failure)?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
            master_key,
        };
        store.check_verifier()?;

        tracing::debug!(path = %store.path.display(), "secret store opened");
        Ok(store)
    }

    /// Release the database connection.  Data stays on disk.
    pub fn close(self) -> Result<()> {
        let path = self.path.clone();
        self.conn.close().map_err(|(_, e)| VaultError::from(e))?;
        tracing::debug!(path = %path.display(), "secret store closed");
        Ok(())
    }

    /// Irreversibly delete the store at `path`, open or not.
    ///
    /// Missing files are not an error.
    pub fn destroy(path: &Path) -> Result<()> {
        remove_if_exists(path)?;
        for suffix in SIDECAR_SUFFIXES {
            let mut sidecar = path.as_os_str().to_owned();
            sidecar.push(suffix);
            remove_if_exists(Path::new(&sidecar))?;
        }
        tracing::info!(path = %path.display(), "secret store destroyed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Add a record, or update the existing one for the same
    /// `(hostname, type)`.  Returns the id of the record written.
    pub fn add(&mut self, content: &SecretContent) -> Result<String> {
        let lookup = lookup_tag(&self.master_key, &content.hostname, content.kind)?;
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM secrets WHERE lookup = ?1",
                params![lookup],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                let sealed = seal_content(&self.master_key, &id, &lookup, content)?;
                tx.execute(
                    "UPDATE secrets SET content = ?1, date = ?2 WHERE id = ?3",
                    params![sealed, now, id],
                )?;
                tracing::debug!(id = %id, "existing record updated on add");
                id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let sealed = seal_content(&self.master_key, &id, &lookup, content)?;
                tx.execute(
                    "INSERT INTO secrets (id, lookup, content, date, tags)
                     VALUES (?1, ?2, ?3, ?4, '[]')",
                    params![id, lookup, sealed, now],
                )?;
                tracing::debug!(id = %id, "record added");
                id
            }
        };
        tx.commit()?;

        Ok(id)
    }

    /// Replace the content of record `id`.
    pub fn update(&mut self, id: &str, content: &SecretContent) -> Result<()> {
        let lookup = lookup_tag(&self.master_key, &content.hostname, content.kind)?;
        let sealed = seal_content(&self.master_key, id, &lookup, content)?;

        let changed = self.conn.execute(
            "UPDATE secrets SET lookup = ?1, content = ?2, date = ?3 WHERE id = ?4",
            params![lookup, sealed, Utc::now().to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(VaultError::RecordNotFound(id.to_string()));
        }

        tracing::debug!(id = %id, "record updated");
        Ok(())
    }

    /// Remove record `id`.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM secrets WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(VaultError::RecordNotFound(id.to_string()));
        }

        tracing::debug!(id = %id, "record deleted");
        Ok(())
    }

    /// Replace the tag set of record `id`.
    pub fn set_tags(&mut self, id: &str, tags: &BTreeSet<String>) -> Result<()> {
        let json = serde_json::to_string(tags)
            .map_err(|e| VaultError::SerializationError(format!("tags: {e}")))?;

        let changed = self.conn.execute(
            "UPDATE secrets SET tags = ?1 WHERE id = ?2",
            params![json, id],
        )?;
        if changed == 0 {
            return Err(VaultError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Decrypt and return every record.  Order is unspecified.
    pub fn list(&self) -> Result<Vec<SecretRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ROW_COLUMNS} FROM secrets"))?;
        let rows = stmt.query_map([], RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(self.open_row(row?)?);
        }
        Ok(records)
    }

    /// Find the record for `(hostname, kind)` through the keyed index.
    ///
    /// A row whose decrypted content names another host or type is
    /// reported as `DecryptionFailed`, never returned.
    pub fn find(&self, hostname: &str, kind: SecretType) -> Result<Option<SecretRecord>> {
        let lookup = lookup_tag(&self.master_key, hostname, kind)?;

        let raw = self
            .conn
            .query_row(
                &format!("SELECT {ROW_COLUMNS} FROM secrets WHERE lookup = ?1"),
                params![lookup],
                RawRow::from_row,
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let record = self.open_row(raw)?;
        if record.content.hostname != hostname || record.content.kind != kind {
            tracing::warn!(id = %record.id, "index entry does not match record content");
            return Err(VaultError::DecryptionFailed);
        }
        Ok(Some(record))
    }

    /// Number of records, without decrypting any of them.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM secrets", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this store was opened with `key`.
    pub fn key_matches(&self, key: &MasterKey) -> bool {
        self.master_key.matches(key)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Check the sealed verifier, or create it on a fresh store.
    fn check_verifier(&self) -> Result<()> {
        let stored: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM vault_meta WHERE name = ?1",
                params![VERIFIER_NAME],
                |row| row.get(0),
            )
            .optional()
            .map_err(open_failure)?;

        let mut key = self.master_key.derive_verifier_key()?;
        let result = match stored {
            Some(blob) => decrypt(&key, &blob, VERIFIER_NAME.as_bytes()).and_then(|plain| {
                if plain == VERIFIER_PLAINTEXT {
                    Ok(())
                } else {
                    Err(VaultError::DecryptionFailed)
                }
            }),
            None => self.seal_new_verifier(&key),
        };
        key.zeroize();
        result
    }

    /// Write the verifier for a store that has none yet.
    ///
    /// A store that already holds records but lost its verifier must
    /// still decrypt under this key before we vouch for it.
    fn seal_new_verifier(&self, key: &[u8]) -> Result<()> {
        let first = self
            .conn
            .query_row(
                &format!("SELECT {ROW_COLUMNS} FROM secrets LIMIT 1"),
                [],
                RawRow::from_row,
            )
            .optional()
            .map_err(open_failure)?;
        if let Some(raw) = first {
            self.open_row(raw).map_err(|_| VaultError::DecryptionFailed)?;
        }

        let blob = encrypt(key, VERIFIER_PLAINTEXT, VERIFIER_NAME.as_bytes())?;
        self.conn
            .execute(
                "INSERT INTO vault_meta (name, value) VALUES (?1, ?2)",
                params![VERIFIER_NAME, blob],
            )
            .map_err(open_failure)?;
        Ok(())
    }

    fn open_row(&self, raw: RawRow) -> Result<SecretRecord> {
        let mut record_key = self.master_key.derive_record_key(&raw.id)?;
        let plain = decrypt(&record_key, &raw.content, &record_aad(&raw.id, &raw.lookup));
        record_key.zeroize();
        let plain = Zeroizing::new(plain?);

        let content: SecretContent =
            serde_json::from_slice(&plain).map_err(|_| VaultError::DecryptionFailed)?;

        let date = DateTime::parse_from_rfc3339(&raw.date)
            .map_err(|e| VaultError::SerializationError(format!("record date: {e}")))?
            .with_timezone(&Utc);

        let tags: BTreeSet<String> = serde_json::from_str(&raw.tags)
            .map_err(|e| VaultError::SerializationError(format!("record tags: {e}")))?;

        Ok(SecretRecord {
            id: raw.id,
            content,
            date,
            tags,
        })
    }
}

/// A row as read from SQLite, before decryption.
struct RawRow {
    id: String,
    lookup: Vec<u8>,
    content: Vec<u8>,
    date: String,
    tags: String,
}

impl RawRow {
    /// Reads the columns in `ROW_COLUMNS` order.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            lookup: row.get(1)?,
            content: row.get(2)?,
            date: row.get(3)?,
            tags: row.get(4)?,
        })
    }
}

fn record_aad(id: &str, lookup: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(id.len() + lookup.len());
    aad.extend_from_slice(id.as_bytes());
    aad.extend_from_slice(lookup);
    aad
}

fn seal_content(
    master_key: &MasterKey,
    id: &str,
    lookup: &[u8],
    content: &SecretContent,
) -> Result<Vec<u8>> {
    let json = Zeroizing::new(
        serde_json::to_vec(content)
            .map_err(|e| VaultError::SerializationError(format!("content: {e}")))?,
    );

    let mut record_key = master_key.derive_record_key(id)?;
    let sealed = encrypt(&record_key, &json, &record_aad(id, lookup));
    record_key.zeroize();
    sealed
}

fn lookup_tag(master_key: &MasterKey, hostname: &str, kind: SecretType) -> Result<Vec<u8>> {
    let mut index_key = master_key.derive_index_key()?;
    let mac = Hmac::<Sha256>::new_from_slice(&index_key);
    index_key.zeroize();

    let mut mac = mac.map_err(|e| VaultError::EncryptionFailed(format!("index key: {e}")))?;
    mac.update(hostname.as_bytes());
    mac.update(&[0]);
    mac.update(kind.as_str().as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Classify a SQLite error raised while reading the schema or verifier.
///
/// Faults of the environment stay `StoreIo`.  Anything else means the
/// file is not a store we can read, which is reported like a wrong key.
fn open_failure(e: rusqlite::Error) -> VaultError {
    match e.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::DiskFull
            | ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::OutOfMemory,
        ) => VaultError::from(e),
        _ => {
            tracing::debug!(error = %e, "store file unreadable");
            VaultError::DecryptionFailed
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VaultError::Io(e)),
    }
}
