//! Vault module — encrypted secret storage and its lock state.
//!
//! This module provides:
//! - `SecretRecord`, `SecretContent` and `SecretType` (`secret`)
//! - The SQLite-backed `SecretStore` with field-level encryption (`store`)
//! - `VaultManager`, the LOCKED / UNLOCKED state machine (`manager`)

pub mod manager;
pub mod secret;
pub mod store;

pub use manager::{StoreHandle, VaultManager, VaultState};
pub use secret::{SecretContent, SecretRecord, SecretType, DEFAULT_USERNAME};
pub use store::SecretStore;
