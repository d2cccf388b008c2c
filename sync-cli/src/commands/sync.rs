//! Sync a local directory into a container.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use sync_client::{SyncConfig, SyncExecutor};
use sync_store::ObjectStore;
use sync_types::ContainerName;

/// Run the sync command.
///
/// Prints one line per file as it is processed, then a summary. Returns
/// `false` if any file failed.
pub async fn run<S: ObjectStore>(
    store: S,
    config: SyncConfig,
    root: &Path,
    container: &ContainerName,
    out: &mut impl Write,
) -> Result<bool> {
    let executor = SyncExecutor::new(store, config);

    let mut write_error = None;
    let report = executor
        .sync_with(root, container, |outcome| {
            if write_error.is_none() {
                if let Err(e) = writeln!(out, "{outcome}") {
                    write_error = Some(e);
                }
            }
        })
        .await
        .with_context(|| format!("Failed to sync {} into {container}", root.display()))?;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write output");
    }
    writeln!(out, "{report}")?;
    Ok(!report.has_failures())
}
