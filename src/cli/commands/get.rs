//! `hostvault get` — print one credential.

use crate::cli::{open_context, unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, host: &str, kind: &str) -> Result<()> {
    // Reject a bad type before asking for the password.
    kind.parse::<crate::session::CredentialKind>()?;

    let ctx = open_context(cli)?;
    unlock(&ctx)?;
    let creds = ctx.credentials();

    let value = creds.retrieve(host, kind);
    creds.lock()?;

    match value? {
        Some(v) => {
            println!("{}", v.secret());
            Ok(())
        }
        None => Err(VaultError::RecordNotFound(format!("{host}/{kind}"))),
    }
}
