//! `hostvault reset` — destroy the vault.  No password needed.

use crate::cli::output;
use crate::cli::{confirm, open_context, Cli};
use crate::errors::Result;

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let ctx = open_context(cli)?;

    if !ctx.manager().store_exists() {
        output::info("No vault to reset.");
        return Ok(());
    }

    if !force
        && !confirm("Destroy the vault and every saved credential? This cannot be undone")?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    ctx.credentials().reset()?;
    output::success(&format!(
        "Vault destroyed at {}",
        ctx.manager().store_path().display()
    ));
    Ok(())
}
