//! `hostvault tag` — replace the tags on a saved credential.

use std::collections::BTreeSet;

use crate::cli::output;
use crate::cli::{open_context, unlock, Cli};
use crate::errors::Result;
use crate::session::CredentialKind;

/// Execute the `tag` command.
pub fn execute(cli: &Cli, host: &str, kind: &str, tags: &[String]) -> Result<()> {
    // Reject a bad type before asking for the password.
    kind.parse::<CredentialKind>()?;
    let tags: BTreeSet<String> = tags.iter().cloned().collect();

    let ctx = open_context(cli)?;
    unlock(&ctx)?;
    let creds = ctx.credentials();

    let tagged = creds.tag(host, kind, tags.clone());
    creds.lock()?;
    tagged?;

    if tags.is_empty() {
        output::success(&format!("Cleared tags on {kind} for '{host}'"));
    } else {
        output::success(&format!("Tagged {kind} for '{host}' ({} tags)", tags.len()));
    }
    Ok(())
}
