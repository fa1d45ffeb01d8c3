//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::context::VaultContext;
use crate::errors::{Result, VaultError};

/// Environment variable read before prompting for the vault password.
pub const PASSWORD_ENV: &str = "HOSTVAULT_PASSWORD";

/// Minimum length for a brand-new vault password.
const MIN_PASSWORD_LEN: usize = 8;

/// HostVault CLI: encrypted per-host credential vault.
#[derive(Parser)]
#[command(
    name = "hostvault",
    about = "Encrypted per-host credential vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (overrides `vault_dir` in .hostvault.toml)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Save a host's password or key file (add or update)
    Set {
        /// Hostname the credential belongs to
        host: String,

        /// Login name (default: from settings, usually "root")
        #[arg(short, long)]
        username: Option<String>,

        /// Password value (omit for an interactive prompt)
        #[arg(long, conflicts_with = "keyfile")]
        value: Option<String>,

        /// Read the password value from stdin
        #[arg(long, conflicts_with_all = ["value", "keyfile"])]
        password_stdin: bool,

        /// Store the contents of this key file instead of a password
        #[arg(short, long)]
        keyfile: Option<PathBuf>,

        /// Display label (default: the key file name)
        #[arg(long = "ref")]
        reference: Option<String>,
    },

    /// Print a host's password or key file
    Get {
        /// Hostname
        host: String,
        /// Credential type: password or keyfile
        kind: String,
    },

    /// List all saved credentials (secrets are not shown)
    List,

    /// Delete a saved credential
    Delete {
        /// Hostname
        host: String,
        /// Credential type: password or keyfile
        kind: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Replace the tags on a saved credential
    Tag {
        /// Hostname
        host: String,
        /// Credential type: password or keyfile
        kind: String,
        /// Tags to set (none clears them)
        tags: Vec<String>,
    },

    /// Destroy the vault and every credential in it
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Build the vault context for the current directory.
pub fn open_context(cli: &Cli) -> Result<VaultContext> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir = dir.clone();
    }
    Ok(VaultContext::from_settings(&settings, &cwd))
}

/// Prompt for the password and unlock the vault.
///
/// A vault that does not exist yet asks for a new password with
/// confirmation; the first unlock creates it.
pub fn unlock(ctx: &VaultContext) -> Result<()> {
    let password = if ctx.manager().store_exists() {
        prompt_password()?
    } else {
        prompt_new_password()?
    };
    ctx.credentials().unlock(&password)
}

/// Get the vault password, trying in order:
/// 1. `HOSTVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (first use of a vault).
///
/// Also respects `HOSTVAULT_PASSWORD`.  Enforces a minimum length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        if pw.len() < MIN_PASSWORD_LEN {
            return Err(VaultError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))
}
