pub mod cli;
pub mod config;
pub mod context;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod session;
pub mod vault;

pub use context::VaultContext;
pub use errors::{Result, VaultError};
