//! `hostvault list` — show saved credentials without their secrets.

use crate::cli::output;
use crate::cli::{open_context, unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = open_context(cli)?;
    unlock(&ctx)?;
    let creds = ctx.credentials();

    let records = creds.records();
    creds.lock()?;

    output::print_records_table(&records?);
    Ok(())
}
