//! `hostvault set` — save a host's password or key file.

use std::io::{self, Read};
use std::path::Path;

use crate::cli::output;
use crate::cli::{open_context, unlock, Cli};
use crate::errors::{Result, VaultError};
use crate::session::SaveRequest;

/// Execute the `set` command.
pub fn execute(
    cli: &Cli,
    host: &str,
    username: Option<&str>,
    value: Option<&str>,
    password_stdin: bool,
    keyfile: Option<&Path>,
    reference: Option<&str>,
) -> Result<()> {
    let mut request = match keyfile {
        Some(path) => SaveRequest::keyfile_from_path(host, path)?,
        None => SaveRequest::password(host, &read_password_value(host, value, password_stdin)?),
    };
    if let Some(u) = username {
        request = request.with_username(u);
    }
    if let Some(r) = reference {
        request = request.with_reference(r);
    }

    let ctx = open_context(cli)?;
    unlock(&ctx)?;
    let creds = ctx.credentials();

    let existed = creds.retrieve(host, &request.kind)?.is_some();
    let saved = creds.save_to_vault(&request);
    creds.lock()?;
    saved?;

    let verb = if existed { "updated" } else { "saved" };
    output::success(&format!("{} for '{host}' {verb}", request.kind));
    Ok(())
}

/// Pick the password from one of three sources.
fn read_password_value(host: &str, value: Option<&str>, from_stdin: bool) -> Result<String> {
    if let Some(v) = value {
        // Source 1: inline value on the command line.
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(v.to_string());
    }

    if from_stdin {
        // Source 2: --password-stdin.
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf.trim_end_matches(['\n', '\r']).to_string());
    }

    // Source 3: interactive secure prompt.
    dialoguer::Password::new()
        .with_prompt(format!("Password for {host}"))
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))
}
