//! Caller-facing credential types.

use std::fmt;
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::VaultError;
use crate::vault::SecretType;

/// The credential kinds callers ask for: `password` or `keyfile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Password,
    Keyfile,
}

impl CredentialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKind::Password => "password",
            CredentialKind::Keyfile => "keyfile",
        }
    }

    /// The persisted type this kind is stored as.
    pub fn secret_type(self) -> SecretType {
        match self {
            CredentialKind::Password => SecretType::Password,
            CredentialKind::Keyfile => SecretType::Key,
        }
    }
}

impl From<SecretType> for CredentialKind {
    fn from(t: SecretType) -> Self {
        match t {
            SecretType::Password => CredentialKind::Password,
            SecretType::Key => CredentialKind::Keyfile,
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(CredentialKind::Password),
            "keyfile" => Ok(CredentialKind::Keyfile),
            other => Err(VaultError::InvalidCredentialType(other.to_string())),
        }
    }
}

/// A key file as held in the session: its original name and text.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Keyfile {
    pub name: String,
    pub contents: String,
}

impl Keyfile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

impl fmt::Debug for Keyfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyfile")
            .field("name", &self.name)
            .field("contents", &"<redacted>")
            .finish()
    }
}

/// A decrypted credential value.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialValue {
    Password(String),
    Keyfile(Keyfile),
}

impl CredentialValue {
    pub fn kind(&self) -> CredentialKind {
        match self {
            CredentialValue::Password(_) => CredentialKind::Password,
            CredentialValue::Keyfile(_) => CredentialKind::Keyfile,
        }
    }

    /// The secret text: the password, or the key file contents.
    pub fn secret(&self) -> &str {
        match self {
            CredentialValue::Password(p) => p,
            CredentialValue::Keyfile(k) => &k.contents,
        }
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialValue::Password(_) => f.write_str("Password(<redacted>)"),
            CredentialValue::Keyfile(k) => f.debug_tuple("Keyfile").field(k).finish(),
        }
    }
}

impl Drop for CredentialValue {
    fn drop(&mut self) {
        if let CredentialValue::Password(p) = self {
            p.zeroize();
        }
    }
}

/// Everything the session knows about one host.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialCacheEntry {
    pub password: Option<String>,
    pub username: Option<String>,
    pub keyfile: Option<Keyfile>,
}

impl CredentialCacheEntry {
    /// `true` once neither a password nor a key file is left.
    pub fn has_no_credentials(&self) -> bool {
        self.password.is_none() && self.keyfile.is_none()
    }
}

impl fmt::Debug for CredentialCacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCacheEntry")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("keyfile", &self.keyfile)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_caller_names() {
        assert_eq!("password".parse::<CredentialKind>().unwrap(), CredentialKind::Password);
        assert_eq!("keyfile".parse::<CredentialKind>().unwrap(), CredentialKind::Keyfile);
    }

    #[test]
    fn kind_rejects_other_names() {
        for bad in ["PASSWORD", "KEY", "token", " password", ""] {
            assert!(matches!(
                bad.parse::<CredentialKind>(),
                Err(VaultError::InvalidCredentialType(_))
            ));
        }
    }

    #[test]
    fn kind_maps_to_persisted_type_and_back() {
        assert_eq!(CredentialKind::Password.secret_type(), SecretType::Password);
        assert_eq!(CredentialKind::Keyfile.secret_type(), SecretType::Key);
        assert_eq!(CredentialKind::from(SecretType::Key), CredentialKind::Keyfile);
    }

    #[test]
    fn debug_never_prints_secrets() {
        let pw = CredentialValue::Password("s3cr3t".into());
        let kf = CredentialValue::Keyfile(Keyfile::new("id_rsa", "PRIVATE"));
        assert!(!format!("{pw:?}").contains("s3cr3t"));
        let kf_dbg = format!("{kf:?}");
        assert!(kf_dbg.contains("id_rsa"));
        assert!(!kf_dbg.contains("PRIVATE"));
    }
}
