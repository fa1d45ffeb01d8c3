//! `hostvault delete` — remove a saved credential from the vault.

use crate::cli::output;
use crate::cli::{confirm, open_context, unlock, Cli};
use crate::errors::{Result, VaultError};
use crate::session::CredentialKind;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, host: &str, kind: &str, force: bool) -> Result<()> {
    kind.parse::<CredentialKind>()?;

    if !force && !confirm(&format!("Delete the {kind} for '{host}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let ctx = open_context(cli)?;
    unlock(&ctx)?;
    let creds = ctx.credentials();

    let deleted = creds.delete_from_vault(host, kind);
    creds.lock()?;

    if deleted? {
        output::success(&format!("Deleted {kind} for '{host}'"));
        Ok(())
    } else {
        Err(VaultError::RecordNotFound(format!("{host}/{kind}")))
    }
}
