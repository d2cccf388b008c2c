//! List the objects of a container with their fingerprints.

use anyhow::{Context, Result};
use std::io::Write;
use sync_client::fetch_manifest;
use sync_store::ObjectStore;
use sync_types::ContainerName;

/// Run the list-objects command.
pub async fn run<S: ObjectStore>(
    store: &S,
    container: &ContainerName,
    out: &mut impl Write,
) -> Result<()> {
    let manifest = fetch_manifest(store, container)
        .await
        .with_context(|| format!("Failed to list objects in {container}"))?;
    for (key, fingerprint) in manifest.sorted() {
        writeln!(out, "{key}  {fingerprint}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_store::MemoryStore;
    use sync_types::ObjectKey;

    #[tokio::test]
    async fn lists_every_page_sorted() {
        let name = ContainerName::parse("listing").unwrap();
        let store = MemoryStore::new().with_page_size(1);
        for k in ["b.txt", "a.txt", "dir/c.txt"] {
            store.insert_object(&name, &ObjectKey::parse(k).unwrap(), b"abc", 1024);
        }

        let mut out = Vec::new();
        run(&store, &name, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let keys: Vec<&str> = text
            .lines()
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(keys, vec!["a.txt", "b.txt", "dir/c.txt"]);
        assert!(text.contains("\"900150983cd24fb0d6963f7d28e17f72\""));
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn missing_container_is_error() {
        let store = MemoryStore::new();
        let name = ContainerName::parse("absent").unwrap();
        let mut out = Vec::new();
        assert!(run(&store, &name, &mut out).await.is_err());
    }
}
