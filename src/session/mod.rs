//! Session module — decrypted credentials available while unlocked.
//!
//! This module provides:
//! - Caller-facing credential types (`credential`)
//! - The in-memory hostname → credentials cache (`cache`)
//! - `CredentialService`, the operation surface callers use (`facade`)

pub mod cache;
pub mod credential;
pub mod facade;

pub use cache::CredentialCache;
pub use credential::{CredentialCacheEntry, CredentialKind, CredentialValue, Keyfile};
pub use facade::{CredentialService, SaveRequest};
