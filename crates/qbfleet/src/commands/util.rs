//! Shared helpers for command handlers.

use qbfleet_core::{HostConnection, HostId};

use crate::error::CliError;

/// Resolve a host identifier (name or id) against the configured set.
pub fn resolve_host(hosts: &[HostConnection], identifier: &str) -> Result<HostId, CliError> {
    hosts
        .iter()
        .find(|h| h.id.as_str() == identifier || h.name == identifier)
        .map(|h| h.id.clone())
        .ok_or_else(|| CliError::HostNotFound {
            identifier: identifier.into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
