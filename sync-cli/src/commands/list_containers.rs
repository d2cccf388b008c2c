//! List owned containers.

use anyhow::{Context, Result};
use std::io::Write;
use sync_store::ObjectStore;

/// Run the list-containers command.
pub async fn run<S: ObjectStore>(store: &S, out: &mut impl Write) -> Result<()> {
    let containers = store
        .list_containers()
        .await
        .context("Failed to list containers")?;
    for container in containers {
        writeln!(out, "{container}")?;
    }
    Ok(())
}
