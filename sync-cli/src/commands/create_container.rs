//! Create a container.

use anyhow::{Context, Result};
use std::io::Write;
use sync_store::ObjectStore;
use sync_types::ContainerName;

/// Run the create-container command.
///
/// Returns `false` when the name is taken by someone else.
pub async fn run<S: ObjectStore>(
    store: &S,
    container: &ContainerName,
    out: &mut impl Write,
) -> Result<bool> {
    let outcome = store
        .create_container(container)
        .await
        .with_context(|| format!("Failed to create container {container}"))?;
    writeln!(out, "{container}: {outcome}")?;
    Ok(outcome.is_usable())
}
