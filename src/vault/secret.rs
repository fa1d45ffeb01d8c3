//! Record types stored inside the secret store.
//!
//! A `SecretRecord` pairs clear metadata (id, date, tags) with a
//! `SecretContent` payload that only ever touches disk encrypted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::VaultError;

/// Username used when a save request does not name one.
pub const DEFAULT_USERNAME: &str = "root";

/// Persisted credential type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecretType {
    Password,
    Key,
}

impl SecretType {
    pub fn as_str(self) -> &'static str {
        match self {
            SecretType::Password => "PASSWORD",
            SecretType::Key => "KEY",
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretType {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASSWORD" => Ok(SecretType::Password),
            "KEY" => Ok(SecretType::Key),
            other => Err(VaultError::InvalidCredentialType(other.to_string())),
        }
    }
}

/// The encrypted part of a record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretContent {
    pub hostname: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(rename = "type")]
    #[zeroize(skip)]
    pub kind: SecretType,

    /// Display label; the original file name for `KEY` records.
    #[serde(rename = "ref", default)]
    pub reference: String,

    /// The password itself, or the textual contents of the key file.
    pub credential: String,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

impl SecretContent {
    pub fn password(hostname: &str, username: &str, password: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            username: username.to_string(),
            kind: SecretType::Password,
            reference: String::new(),
            credential: password.to_string(),
        }
    }

    pub fn key(hostname: &str, username: &str, file_name: &str, contents: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            username: username.to_string(),
            kind: SecretType::Key,
            reference: file_name.to_string(),
            credential: contents.to_string(),
        }
    }
}

impl fmt::Debug for SecretContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretContent")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("kind", &self.kind)
            .field("reference", &self.reference)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// A single persisted credential entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub id: String,
    pub content: SecretContent,
    /// When the record was last written.
    pub date: DateTime<Utc>,
    pub tags: BTreeSet<String>,
}
